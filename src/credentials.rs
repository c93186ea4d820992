// Connection parameters for a running League client, and the parser for the
// `lockfile` the client writes next to its executable while it is running.

use crate::error::DiscoveryError;
use std::fmt;
use std::str::FromStr;

/// The client always authenticates its local API with this user name.
pub const LCU_USERNAME: &str = "riot";
/// The local API only listens on the loopback interface.
pub const LCU_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(DiscoveryError::Malformed(format!(
                "unsupported protocol `{other}`"
            ))),
        }
    }
}

/// Everything needed to talk to one client session. Only constructible fully
/// populated, and never modified afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    scheme: Scheme,
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl ConnectionParameters {
    pub fn new(
        scheme: Scheme,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, DiscoveryError> {
        let host = host.into();
        let username = username.into();
        let password = password.into();
        if host.trim().is_empty() {
            return Err(DiscoveryError::Malformed("empty host".into()));
        }
        if port == 0 {
            return Err(DiscoveryError::Malformed("port 0".into()));
        }
        if username.is_empty() {
            return Err(DiscoveryError::Malformed("empty username".into()));
        }
        if password.is_empty() {
            return Err(DiscoveryError::Malformed("empty password".into()));
        }
        Ok(Self {
            scheme,
            host,
            port,
            username,
            password,
        })
    }

    /// Parameters for a client session on the loopback interface, as found
    /// in the lockfile or on the client's command line.
    pub fn local(scheme: Scheme, port: u16, password: impl Into<String>) -> Result<Self, DiscoveryError> {
        Self::new(scheme, LCU_HOST, port, LCU_USERNAME, password)
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// `{scheme}://{host}:{port}`, with IPv6 literals bracketed.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }

    /// Whether the host names the local machine.
    pub fn is_loopback(&self) -> bool {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }
        host.parse::<std::net::IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
    }
}

// The password is a per-session secret; keep it out of logs.
impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse the lockfile contents: `name:pid:port:password:protocol`.
pub fn parse_lockfile(contents: &str) -> Result<ConnectionParameters, DiscoveryError> {
    let line = contents.trim();
    let fields: Vec<&str> = line.split(':').collect();
    let [_name, pid, port, password, protocol] = fields.as_slice() else {
        return Err(DiscoveryError::Malformed(format!(
            "expected 5 `:`-separated fields in lockfile, found {}",
            fields.len()
        )));
    };
    pid.parse::<u32>()
        .map_err(|_| DiscoveryError::Malformed(format!("invalid pid `{pid}`")))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| DiscoveryError::Malformed(format!("invalid port `{port}`")))?;
    let scheme: Scheme = protocol.parse()?;
    ConnectionParameters::local(scheme, port, *password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_lockfile_line() {
        let params = parse_lockfile("LeagueClient:12345:54321:s3cr3t-T0ken:https\n").unwrap();
        assert_eq!(params.scheme(), Scheme::Https);
        assert_eq!(params.host(), "127.0.0.1");
        assert_eq!(params.port(), 54321);
        assert_eq!(params.username(), "riot");
        assert_eq!(params.password(), "s3cr3t-T0ken");
        assert_eq!(params.base_url(), "https://127.0.0.1:54321");
    }

    #[test]
    fn rejects_malformed_lockfiles() {
        for bad in [
            "",
            "LeagueClient:1:2:pw",
            "LeagueClient:1:2:pw:https:extra",
            "LeagueClient:x:2:pw:https",
            "LeagueClient:1:99999:pw:https",
            "LeagueClient:1:2:pw:ftp",
            "LeagueClient:1:2::https",
            "LeagueClient:1:0:pw:https",
        ] {
            assert!(
                matches!(parse_lockfile(bad), Err(DiscoveryError::Malformed(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn debug_output_hides_the_password() {
        let params = ConnectionParameters::local(Scheme::Https, 2999, "hunter2").unwrap();
        let rendered = format!("{params:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("2999"));
    }

    #[test]
    fn loopback_detection() {
        let local = |host: &str| {
            ConnectionParameters::new(Scheme::Https, host, 1, "u", "p")
                .unwrap()
                .is_loopback()
        };
        assert!(local("127.0.0.1"));
        assert!(local("localhost"));
        assert!(local("::1"));
        assert!(!local("example.com"));
        assert!(!local("10.0.0.2"));
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let params = ConnectionParameters::new(Scheme::Http, "::1", 8080, "u", "p").unwrap();
        assert_eq!(params.base_url(), "http://[::1]:8080");
    }
}
