//! Protocol version negotiation during `initialize`.

use crate::types::{
    InitializeParams, InitializeResult, McpError, McpResult, SUPPORTED_PROTOCOL_VERSIONS,
};

/// Accept `requested` only if it is one of the supported versions.
pub fn negotiate_version(requested: &str) -> McpResult<&'static str> {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .copied()
        .find(|v| *v == requested)
        .ok_or_else(|| McpError::UnsupportedProtocolVersion {
            requested: requested.to_string(),
            supported: SUPPORTED_PROTOCOL_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect(),
        })
}

pub fn negotiate(params: &InitializeParams, server_name: &str) -> McpResult<InitializeResult> {
    let version = negotiate_version(&params.protocol_version).inspect_err(|_| {
        tracing::warn!(
            "Client {} requested unsupported protocol version {}",
            params.client_info.name,
            params.protocol_version
        );
    })?;

    tracing::info!(
        "Initializing client: {} v{} (protocol {version})",
        params.client_info.name,
        params.client_info.version
    );

    Ok(InitializeResult::negotiated(version, server_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        assert_eq!(negotiate_version("2024-11-05").unwrap(), "2024-11-05");
        assert_eq!(negotiate_version("2025-03-26").unwrap(), "2025-03-26");
        assert!(matches!(
            negotiate_version("2024-11"),
            Err(McpError::UnsupportedProtocolVersion { .. })
        ));
    }
}
