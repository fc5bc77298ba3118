//! XML response parsing for device and system queries.

use super::DeviceIdentity;
use crate::error::{InventoryError, Result};
use roxmltree::{Document, Node};

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

fn descend<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    path.iter().try_fold(node, |current, name| child(current, name))
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse_document<'input>(context: &str, xml: &'input str) -> Result<Document<'input>> {
    Document::parse(xml).map_err(|e| InventoryError::parse(context, e))
}

/// Error message of a `<response status="error">` envelope, if that is what
/// `body` is. Non-XML bodies are not considered errors here.
pub fn response_error(body: &str) -> Option<String> {
    let doc = Document::parse(body).ok()?;
    let root = doc.root_element();

    if !root.has_tag_name("response") || root.attribute("status") != Some("error") {
        return None;
    }

    let message = root
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(if message.is_empty() {
        "request failed without a message".to_string()
    } else {
        message
    })
}

fn identity_from(node: Node<'_, '_>) -> std::result::Result<DeviceIdentity, &'static str> {
    let field = |name: &'static str| child_text(node, name).ok_or(name);

    Ok(DeviceIdentity {
        serial: field("serial")?,
        hostname: field("hostname")?,
        ip_address: field("ip-address")?,
        family: field("family")?,
        model: field("model")?,
        software_version: field("sw-version")?,
    })
}

/// Parse a `show devices connected` response into device identities.
///
/// Entries lacking one of the identity elements are skipped.
pub fn parse_connected_devices(xml: &str) -> Result<Vec<DeviceIdentity>> {
    const CONTEXT: &str = "connected devices";

    let doc = parse_document(CONTEXT, xml)?;
    let result = descend(doc.root_element(), &["result"])
        .ok_or_else(|| InventoryError::parse(CONTEXT, "missing <result>"))?;

    let Some(devices) = child(result, "devices") else {
        tracing::debug!("No <devices> element, management plane has no connected devices");
        return Ok(Vec::new());
    };

    let mut identities = Vec::new();
    for entry in devices
        .children()
        .filter(|n| n.is_element() && n.has_tag_name("entry"))
    {
        match identity_from(entry) {
            Ok(identity) => identities.push(identity),
            Err(missing) => {
                tracing::warn!(
                    "Skipping connected device entry {:?}: missing <{}>",
                    entry.attribute("name").unwrap_or("?"),
                    missing
                );
            }
        }
    }

    Ok(identities)
}

/// Parse a `show system info` response into the queried device's identity.
pub fn parse_system_info(xml: &str) -> Result<DeviceIdentity> {
    const CONTEXT: &str = "system info";

    let doc = parse_document(CONTEXT, xml)?;
    let system = descend(doc.root_element(), &["result", "system"])
        .ok_or_else(|| InventoryError::parse(CONTEXT, "missing <result><system>"))?;

    identity_from(system)
        .map_err(|missing| InventoryError::parse(CONTEXT, format!("missing <{}>", missing)))
}

/// Extract the key from a `type=keygen` response.
pub fn parse_api_key(xml: &str) -> Result<String> {
    const CONTEXT: &str = "keygen response";

    let doc = parse_document(CONTEXT, xml)?;
    descend(doc.root_element(), &["result"])
        .and_then(|result| child_text(result, "key"))
        .ok_or_else(|| InventoryError::parse(CONTEXT, "missing <result><key>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECTED: &str = r#"<response status="success"><result>
  <devices>
    <entry name="001801000123">
      <serial>001801000123</serial>
      <connected>yes</connected>
      <hostname>fw-dc1-core</hostname>
      <ip-address>10.20.0.5</ip-address>
      <model>PA-7080</model>
      <sw-version>10.1.9</sw-version>
      <family>7000</family>
    </entry>
    <entry name="013201000456">
      <serial>013201000456</serial>
      <hostname>fw-branch-7</hostname>
      <ip-address>10.30.7.1</ip-address>
      <model>PA-3220</model>
      <sw-version>10.2.4</sw-version>
      <family>3200</family>
    </entry>
    <entry name="013201000999">
      <serial>013201000999</serial>
      <hostname>fw-half-registered</hostname>
      <model>PA-220</model>
      <sw-version>10.1.0</sw-version>
      <family>220</family>
    </entry>
  </devices>
</result></response>"#;

    #[test]
    fn test_parse_connected_devices() {
        let devices = parse_connected_devices(CONNECTED).unwrap();
        assert_eq!(devices.len(), 2);

        assert_eq!(
            devices[0],
            DeviceIdentity {
                serial: "001801000123".to_string(),
                hostname: "fw-dc1-core".to_string(),
                ip_address: "10.20.0.5".to_string(),
                family: "7000".to_string(),
                model: "PA-7080".to_string(),
                software_version: "10.1.9".to_string(),
            }
        );
        assert_eq!(devices[1].family, "3200");
    }

    #[test]
    fn test_connected_devices_without_devices_element() {
        let xml = r#"<response status="success"><result></result></response>"#;
        assert!(parse_connected_devices(xml).unwrap().is_empty());
    }

    #[test]
    fn test_connected_devices_rejects_garbage() {
        assert!(matches!(
            parse_connected_devices("not xml"),
            Err(InventoryError::Parse { .. })
        ));
        assert!(matches!(
            parse_connected_devices(r#"<response status="success"/>"#),
            Err(InventoryError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_system_info() {
        let xml = r#"<response status="success"><result><system>
            <hostname>pano-a</hostname>
            <ip-address>10.0.0.10</ip-address>
            <model>M-600</model>
            <serial>000710001234</serial>
            <sw-version>10.1.9</sw-version>
            <family>m</family>
        </system></result></response>"#;

        let identity = parse_system_info(xml).unwrap();
        assert_eq!(identity.hostname, "pano-a");
        assert_eq!(identity.ip_address, "10.0.0.10");
        assert_eq!(identity.family, "m");
        assert_eq!(identity.software_version, "10.1.9");
    }

    #[test]
    fn test_system_info_missing_field() {
        let xml = r#"<response status="success"><result><system>
            <hostname>pano-a</hostname>
        </system></result></response>"#;

        let err = parse_system_info(xml).unwrap_err();
        assert!(err.to_string().contains("missing <serial>"), "{}", err);
    }

    #[test]
    fn test_response_error() {
        let xml = r#"<response status="error" code="403"><result><msg>Invalid credentials.</msg></result></response>"#;
        assert_eq!(response_error(xml).as_deref(), Some("Invalid credentials."));

        let ok = r#"<response status="success"><result>ha.app.cli.state-prompt: primary-active
</result></response>"#;
        assert_eq!(response_error(ok), None);
        assert_eq!(response_error("plain text"), None);
    }

    #[test]
    fn test_parse_api_key() {
        let xml = r#"<response status="success"><result><key>LUFRPT1abc==</key></result></response>"#;
        assert_eq!(parse_api_key(xml).unwrap(), "LUFRPT1abc==");
        assert!(parse_api_key(r#"<response status="success"><result/></response>"#).is_err());
    }
}
