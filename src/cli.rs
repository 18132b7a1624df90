use clap::Parser;
use std::path::PathBuf;

/// Content admin service for the tutoring site: edit JSON content and
/// publish it back to the site repository
#[derive(Parser, Debug, Clone)]
#[command(name = "copydesk", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "COPYDESK_CONFIG", default_value = "copydesk.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "COPYDESK_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "COPYDESK_PORT")]
    pub port: Option<u16>,

    /// Local directory the per-domain JSON documents are loaded from
    #[arg(long, env = "COPYDESK_CONTENT_DIR")]
    pub content_dir: Option<PathBuf>,

    /// Owner of the site repository
    #[arg(long, env = "COPYDESK_REPO_OWNER")]
    pub repo_owner: Option<String>,

    /// Name of the site repository
    #[arg(long, env = "COPYDESK_REPO_NAME")]
    pub repo_name: Option<String>,

    /// Branch content is committed to
    #[arg(long, env = "COPYDESK_REPO_BRANCH")]
    pub repo_branch: Option<String>,

    /// Deploy hook POSTed after a successful save
    #[arg(long, env = "COPYDESK_DEPLOY_HOOK")]
    pub deploy_hook_url: Option<String>,
}
