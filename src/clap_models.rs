use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(
author,
version,
about,
long_about = None
)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// Path to JSON config file
    #[clap(short, long, value_parser, default_value_t = String::from("./envstore.json"), env = "ENVSTORE_CONFIG")]
    pub config: String,

    /// Server host, overrides the one from the config file
    #[clap(long, value_parser, global = true, env = "ENVSTORE_HOST")]
    pub host: Option<String>,

    /// Access token, overrides the one from the config file
    #[clap(long, value_parser, global = true, env = "ENVSTORE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tools to interact with environments
    Env {
        #[clap(subcommand)]
        env_command: EnvCommands,
    },

    /// Tools to inspect environment policies
    Policy {
        #[clap(subcommand)]
        policy_command: PolicyCommands,
    },
}

#[derive(Subcommand)]
pub enum EnvCommands {
    /// List environments
    List {
        /// Row statuses to list, e.g. NORMAL,ARCHIVED
        #[clap(long, value_parser, value_delimiter = ',')]
        row_status: Vec<String>,
    },

    /// Show a single environment and its pipeline approval policy
    Show {
        #[clap(value_parser)]
        id: i64,
    },

    /// Create a new environment
    Create {
        #[clap(long, value_parser)]
        name: String,
        #[clap(long, value_parser)]
        order: Option<i32>,
        /// PROTECTED or UNPROTECTED
        #[clap(long, value_parser)]
        tier: Option<String>,
    },

    /// Reorder environments; the given ids are listed in their new order
    Reorder {
        #[clap(value_parser, required = true)]
        ids: Vec<i64>,
    },

    /// Patch attributes of an environment
    Patch {
        #[clap(value_parser)]
        id: i64,
        #[clap(long, value_parser)]
        name: Option<String>,
        #[clap(long, value_parser)]
        order: Option<i32>,
        /// PROTECTED or UNPROTECTED
        #[clap(long, value_parser)]
        tier: Option<String>,
    },

    /// Archive an environment
    Archive {
        #[clap(value_parser)]
        id: i64,
    },

    /// Restore an archived environment
    Restore {
        #[clap(value_parser)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Fetch the policy of an environment
    Show {
        #[clap(value_parser)]
        environment_id: i64,
        #[clap(long = "type", value_parser, default_value_t = String::from("bb.policy.pipeline-approval"))]
        policy_type: String,
    },
}
