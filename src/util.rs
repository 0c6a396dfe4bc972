//! Ready-made leaves for common checks

use anyhow::Context;

use crate::component::Task;
use crate::exec::Cmd;
use crate::vars::{Meta, VarRef};

/// Resolve the host named by `host` and export the first address as `<host>-ip`
pub fn dns_lookup(host: VarRef) -> Task {
    let ip_var = format!("{}-ip", host.name());
    let meta = Meta::new().require([host.name()]).export([ip_var.clone()]);

    Task::from_async("dns-lookup", move |e| {
        let host = host.clone();
        let ip_var = ip_var.clone();
        Box::pin(async move {
            let name = host.expand(e.vars());
            let mut addrs = tokio::net::lookup_host((name.as_str(), 0))
                .await
                .with_context(|| format!("dns lookup of host {name} failed"))?;
            let addr = addrs
                .next()
                .with_context(|| format!("dns lookup of host {name} returned no addresses"))?;

            e.message(&format!("{name} resolved to {}", addr.ip()));
            e.emit(ip_var, addr.ip().to_string());
            Ok(())
        })
    })
    .with_meta(meta)
}

/// `curl -s <url>`
pub fn http_get(url: impl Into<String>) -> Cmd {
    Cmd::new("http-get", "curl", ["-s".to_string(), url.into()])
}
