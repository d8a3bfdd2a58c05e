/// Channel identifier as it appears in the source GIS layer attributes.
///
/// Channel ids are free-form layer names, so a `String` (rather than a compact
/// integer id) is the honest representation.
pub type ChannelId = String;

/// Marker substring identifying connector pseudo-channels.
///
/// A connector is a zero-length "X" link joining two real channels at a
/// junction; it is skipped when walking the network but counts when detecting
/// branch splits. Covers both `"connector"` and `"__connector"` spellings.
pub const CONNECTOR_MARKER: &str = "connector";

/// True if the id names a connector pseudo-channel.
pub fn is_connector(id: &str) -> bool {
    id.to_ascii_lowercase().contains(CONNECTOR_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_marker_variants() {
        assert!(is_connector("pipe_7__connector"));
        assert!(is_connector("connector.12"));
        assert!(is_connector("Pit_Connector_3"));
        assert!(!is_connector("pipe_7"));
        assert!(!is_connector("conn_7"));
    }
}
