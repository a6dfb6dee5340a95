// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path-prefix routing table construction (§4.11).

use std::collections::BTreeMap;

use sm_core::Service;

/// Fallback destination for any path with no matching prefix.
pub const FALLBACK_PORT: u16 = 9017;
pub const DEFAULT_LISTEN_PORT: u16 = 3000;

/// `"/<prefix>" -> "localhost:<default-port>"`, built from the proxy-path
/// list of the requested services (or every frontend-capable service if
/// none were named).
pub fn build_routes<'a>(services: impl IntoIterator<Item = &'a Service>) -> BTreeMap<String, String> {
    let mut routes = BTreeMap::new();
    for service in services {
        for prefix in &service.proxy_paths {
            let key = prefix.trim_start_matches('/').to_string();
            routes.insert(key, format!("localhost:{}", service.default_port));
        }
    }
    routes
}

/// Resolve an incoming request path to its forwarding host, falling back to
/// [`FALLBACK_PORT`] on no match.
pub fn resolve(routes: &BTreeMap<String, String>, path: &str) -> String {
    let first_segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
    routes
        .get(first_segment)
        .cloned()
        .unwrap_or_else(|| format!("localhost:{FALLBACK_PORT}"))
}
