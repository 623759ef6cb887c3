use clap::Parser;

#[derive(Parser)]
#[command(name = "mailverify-cli")]
pub struct Cli {
    /// Single email to verify, or a path to a file of addresses (one per
    /// line, lines without `@` are skipped).
    pub target: Option<String>,

    /// SOCKS5 proxy to route the SMTP connection through, `host:port`.
    #[arg(long)]
    pub proxy: Option<String>,

    /// SOCKS5 proxy username, must be given together with `--proxy-password`.
    #[arg(long)]
    pub proxy_username: Option<String>,

    /// SOCKS5 proxy password, must be given together with `--proxy-username`.
    #[arg(long)]
    pub proxy_password: Option<String>,

    /// Number of concurrent verifications for bulk mode.
    #[arg(long, default_value_t = 20)]
    pub concurrency: usize,
}
