use crate::row::Field;
use kubectl_np_viewer_k8s_api::{IntOrString, NetworkPolicyPort};

/// The ports a rule admits, rendered as `PROTOCOL:PORT` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Ports {
    #[default]
    All,
    Listed(Vec<String>),
}

// === impl Ports ===

impl Ports {
    pub fn from_rule(ports: &[NetworkPolicyPort]) -> Self {
        if ports.is_empty() {
            return Self::All;
        }
        Self::Listed(ports.iter().map(port_text).collect())
    }

    pub fn field(&self) -> Field {
        match self {
            Self::All => Field::Wildcard,
            Self::Listed(ports) => Field::Value(ports.join("\n")),
        }
    }
}

fn port_text(port: &NetworkPolicyPort) -> String {
    let protocol = protocol_name(port.protocol.as_deref());
    let number = match &port.port {
        None => "*".to_string(),
        Some(IntOrString::Int(n)) => n.to_string(),
        Some(IntOrString::String(name)) => name.clone(),
    };
    match port.end_port {
        Some(end) => format!("{protocol}:{number}-{end}"),
        None => format!("{protocol}:{number}"),
    }
}

/// The API server defaults an unset protocol to TCP.
fn protocol_name(protocol: Option<&str>) -> &'static str {
    match protocol {
        None | Some("TCP") => "TCP",
        Some("UDP") => "UDP",
        Some("SCTP") => "SCTP",
        Some(_) => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(
        protocol: Option<&str>,
        port: Option<IntOrString>,
        end_port: Option<i32>,
    ) -> NetworkPolicyPort {
        NetworkPolicyPort {
            protocol: protocol.map(Into::into),
            port,
            end_port,
        }
    }

    #[test]
    fn no_ports_is_wildcard() {
        assert_eq!(Ports::from_rule(&[]).field(), Field::Wildcard);
    }

    #[test]
    fn renders_each_port_on_its_own_line() {
        let ports = Ports::from_rule(&[
            port(Some("TCP"), Some(IntOrString::Int(80)), None),
            port(Some("UDP"), Some(IntOrString::Int(53)), None),
            port(Some("SCTP"), Some(IntOrString::String("diameter".into())), None),
        ]);
        assert_eq!(
            ports.field(),
            Field::Value("TCP:80\nUDP:53\nSCTP:diameter".to_string())
        );
    }

    #[test]
    fn renders_defaults_and_ranges() {
        let ports = Ports::from_rule(&[
            port(None, Some(IntOrString::Int(8080)), None),
            port(Some("TCP"), None, None),
            port(Some("TCP"), Some(IntOrString::Int(32000)), Some(32768)),
        ]);
        assert_eq!(
            ports,
            Ports::Listed(vec![
                "TCP:8080".to_string(),
                "TCP:*".to_string(),
                "TCP:32000-32768".to_string(),
            ])
        );
    }

    #[test]
    fn unknown_protocols_render_empty() {
        let ports = Ports::from_rule(&[port(Some("ICMP"), Some(IntOrString::Int(1)), None)]);
        assert_eq!(ports.field(), Field::Value(":1".to_string()));
    }
}
