use anyhow::{bail, Context};
use mailverify::connection::ProxyConfig;

use crate::Cli;

/// Builds a [`ProxyConfig`] from `--proxy`/`--proxy-username`/
/// `--proxy-password`, if a proxy was requested.
pub fn build_proxy(cli: &Cli) -> anyhow::Result<Option<ProxyConfig>> {
    let Some(proxy) = &cli.proxy else {
        return Ok(None);
    };
    let addr = proxy
        .parse()
        .with_context(|| format!("invalid --proxy address '{proxy}'"))?;

    let credentials = match (&cli.proxy_username, &cli.proxy_password) {
        (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
        (None, None) => None,
        _ => bail!("--proxy-username and --proxy-password must be given together"),
    };

    Ok(Some(ProxyConfig { addr, credentials }))
}
