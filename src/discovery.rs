// Discovery of a running League client.
//
// A `DiscoverySource` answers one question: is a client running right now,
// and if so with which credentials? The `Discoverer` polls a source and turns
// the answers into discrete connection events, so callers only see state
// changes and never the same change twice.

use crate::credentials::{parse_lockfile, ConnectionParameters, Scheme};
use crate::error::DiscoveryError;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name of the UI process whose command line carries the API credentials.
pub const CLIENT_PROCESS: &str = "LeagueClientUx";
pub const LOCKFILE_NAME: &str = "lockfile";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub trait DiscoverySource {
    /// `Ok(None)` means no client is running at the moment.
    fn probe(&mut self) -> Result<Option<ConnectionParameters>, DiscoveryError>;
}

impl<S: DiscoverySource + ?Sized> DiscoverySource for Box<S> {
    fn probe(&mut self) -> Result<Option<ConnectionParameters>, DiscoveryError> {
        (**self).probe()
    }
}

/// Reads the lockfile from the first candidate path that exists.
#[derive(Debug, Clone)]
pub struct LockfileSource {
    candidates: Vec<PathBuf>,
}

impl LockfileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// The lockfile locations of a default client install on this platform.
    pub fn default_locations() -> Self {
        Self::with_candidates(default_lockfile_paths())
    }
}

impl DiscoverySource for LockfileSource {
    fn probe(&mut self) -> Result<Option<ConnectionParameters>, DiscoveryError> {
        for path in &self.candidates {
            if let Some(params) = read_lockfile(path)? {
                return Ok(Some(params));
            }
        }
        Ok(None)
    }
}

/// Read and parse a lockfile. A missing file means the client is not running.
pub fn read_lockfile(path: &Path) -> Result<Option<ConnectionParameters>, DiscoveryError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_lockfile(&contents).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DiscoveryError::Unreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn default_lockfile_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if cfg!(target_os = "windows") {
        paths.push(PathBuf::from(r"C:\Riot Games\League of Legends").join(LOCKFILE_NAME));
    }
    if cfg!(target_os = "macos") {
        paths.push(PathBuf::from("/Applications/League of Legends.app/Contents/LoL").join(LOCKFILE_NAME));
    }
    paths
}

/// What the client's command line tells us about its API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCommandLine {
    pub install_directory: Option<PathBuf>,
    pub credentials: Option<ConnectionParameters>,
}

impl ClientCommandLine {
    /// Credentials from the lockfile in the install directory, falling back
    /// to `--app-port`/`--remoting-auth-token` while the lockfile does not
    /// exist yet.
    pub fn resolve(self) -> Result<Option<ConnectionParameters>, DiscoveryError> {
        if let Some(dir) = &self.install_directory {
            debug!(dir = %dir.display(), "reading lockfile from client install directory");
            if let Some(params) = read_lockfile(&dir.join(LOCKFILE_NAME))? {
                return Ok(Some(params));
            }
        }
        Ok(self.credentials)
    }
}

/// Extract the install directory and the port and auth token from the
/// arguments of a `LeagueClientUx` process.
pub fn parse_client_command_line<S: AsRef<str>>(
    args: &[S],
) -> Result<ClientCommandLine, DiscoveryError> {
    let value_of = |flag: &str| {
        args.iter().find_map(|arg| {
            arg.as_ref()
                .trim_matches('"')
                .strip_prefix(flag)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|v| v.trim_matches('"').to_string())
        })
    };

    let install_directory = value_of("--install-directory")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from);
    let credentials = match (value_of("--app-port"), value_of("--remoting-auth-token")) {
        (Some(port), Some(token)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| DiscoveryError::Malformed(format!("invalid --app-port `{port}`")))?;
            Some(ConnectionParameters::local(Scheme::Https, port, token)?)
        }
        _ => None,
    };
    Ok(ClientCommandLine {
        install_directory,
        credentials,
    })
}

/// Finds the client through the process table.
#[derive(Debug, Default)]
pub struct ProcessSource {
    system: sysinfo::System,
}

impl ProcessSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_command_line(&mut self) -> Option<Vec<String>> {
        use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, UpdateKind};

        // Dead processes must be dropped, or a stopped client keeps matching.
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new().with_cmd(UpdateKind::Always),
        );
        self.system
            .processes()
            .values()
            .find(|p| lossy(p.name()).trim_end_matches(".exe") == CLIENT_PROCESS)
            .map(|p| p.cmd().iter().map(lossy).collect())
    }
}

fn lossy<S: AsRef<OsStr> + ?Sized>(s: &S) -> String {
    s.as_ref().to_string_lossy().into_owned()
}

impl DiscoverySource for ProcessSource {
    fn probe(&mut self) -> Result<Option<ConnectionParameters>, DiscoveryError> {
        let Some(args) = self.client_command_line() else {
            return Ok(None);
        };
        let command_line = parse_client_command_line(args.as_slice())?;
        if command_line == ClientCommandLine::default() {
            return Err(DiscoveryError::Process(format!(
                "{CLIENT_PROCESS} is running but its command line has no API credentials"
            )));
        }
        command_line.resolve()
    }
}

/// Tries each source in order. The first one that finds a client wins; an
/// error is only reported when no source finds one.
pub struct ChainSource {
    sources: Vec<Box<dyn DiscoverySource>>,
}

impl ChainSource {
    pub fn new(sources: Vec<Box<dyn DiscoverySource>>) -> Self {
        Self { sources }
    }

    /// Process scan, then the default lockfile locations.
    pub fn platform_default() -> Self {
        Self::new(vec![
            Box::new(ProcessSource::new()),
            Box::new(LockfileSource::default_locations()),
        ])
    }
}

impl DiscoverySource for ChainSource {
    fn probe(&mut self) -> Result<Option<ConnectionParameters>, DiscoveryError> {
        let mut first_error = None;
        for source in &mut self.sources {
            match source.probe() {
                Ok(Some(params)) => return Ok(Some(params)),
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "discovery source failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected(ConnectionParameters),
    Disconnected,
    Failure(DiscoveryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Connected(ConnectionParameters),
    Failed(String),
}

/// Polls a [`DiscoverySource`] and reports connection state changes.
pub struct Discoverer<S> {
    source: S,
    interval: Duration,
    state: State,
    pending: VecDeque<ConnectionEvent>,
}

impl<S: DiscoverySource> Discoverer<S> {
    pub fn new(source: S) -> Self {
        Self::with_interval(source, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            state: State::Idle,
            pending: VecDeque::new(),
        }
    }

    /// Parameters of the live connection, if there is one.
    pub fn current(&self) -> Option<&ConnectionParameters> {
        match &self.state {
            State::Connected(params) => Some(params),
            _ => None,
        }
    }

    /// Probe the source once (unless events are already queued) and return
    /// the next event. Never sleeps.
    pub fn poll(&mut self) -> Option<ConnectionEvent> {
        if self.pending.is_empty() {
            let probed = self.source.probe();
            self.transition(probed);
        }
        self.pending.pop_front()
    }

    /// Block, probing at the poll interval, until an event is available.
    pub fn wait(&mut self) -> ConnectionEvent {
        loop {
            if let Some(event) = self.poll() {
                return event;
            }
            std::thread::sleep(self.interval);
        }
    }

    fn transition(&mut self, probed: Result<Option<ConnectionParameters>, DiscoveryError>) {
        let state = std::mem::replace(&mut self.state, State::Idle);
        self.state = match (state, probed) {
            (State::Connected(old), Ok(Some(new))) if old == new => State::Connected(old),
            (State::Connected(_), Ok(Some(new))) => {
                info!("League client restarted with new credentials");
                self.pending.push_back(ConnectionEvent::Disconnected);
                self.connect(new)
            }
            (_, Ok(Some(new))) => self.connect(new),
            (State::Connected(_), Ok(None)) => {
                info!("League client stopped");
                self.pending.push_back(ConnectionEvent::Disconnected);
                State::Idle
            }
            (_, Ok(None)) => State::Idle,
            (State::Failed(message), Err(e)) if message == e.to_string() => State::Failed(message),
            (previous, Err(e)) => {
                if matches!(previous, State::Connected(_)) {
                    self.pending.push_back(ConnectionEvent::Disconnected);
                }
                warn!(error = %e, "League client discovery failed");
                let message = e.to_string();
                self.pending.push_back(ConnectionEvent::Failure(e));
                State::Failed(message)
            }
        };
    }

    fn connect(&mut self, params: ConnectionParameters) -> State {
        info!(port = params.port(), scheme = %params.scheme(), "League client found");
        self.pending
            .push_back(ConnectionEvent::Connected(params.clone()));
        State::Connected(params)
    }
}

impl<S: DiscoverySource> Iterator for Discoverer<S> {
    type Item = ConnectionEvent;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.wait())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Probe = Result<Option<ConnectionParameters>, DiscoveryError>;

    /// Replays scripted probe results, then reports "not running".
    struct Scripted(VecDeque<Probe>);

    impl Scripted {
        fn new(script: Vec<Probe>) -> Self {
            Self(script.into())
        }
    }

    impl DiscoverySource for Scripted {
        fn probe(&mut self) -> Probe {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn params(port: u16) -> ConnectionParameters {
        ConnectionParameters::local(Scheme::Https, port, "pw").unwrap()
    }

    fn malformed(msg: &str) -> Probe {
        Err(DiscoveryError::Malformed(msg.into()))
    }

    fn render(event: ConnectionEvent) -> String {
        match event {
            ConnectionEvent::Connected(p) => format!("connected:{}", p.port()),
            ConnectionEvent::Disconnected => "disconnected".to_string(),
            ConnectionEvent::Failure(e) => format!("failure:{e}"),
        }
    }

    fn drain<S: DiscoverySource>(d: &mut Discoverer<S>, polls: usize) -> Vec<String> {
        let mut seen = Vec::new();
        for _ in 0..polls {
            seen.extend(d.poll().map(render));
            seen.extend(d.pending.drain(..).map(render));
        }
        seen
    }

    #[test]
    fn one_event_per_state_change() {
        let mut d = Discoverer::new(Scripted::new(vec![
            Ok(None),
            Ok(Some(params(1000))),
            Ok(Some(params(1000))),
            Ok(Some(params(1000))),
            Ok(None),
            Ok(None),
        ]));
        assert_eq!(drain(&mut d, 6), vec!["connected:1000", "disconnected"]);
        assert!(d.current().is_none());
    }

    #[test]
    fn restart_with_new_credentials_reports_both_changes() {
        let mut d = Discoverer::new(Scripted::new(vec![
            Ok(Some(params(1000))),
            Ok(Some(params(2000))),
        ]));
        assert_eq!(
            drain(&mut d, 2),
            vec!["connected:1000", "disconnected", "connected:2000"]
        );
        assert_eq!(d.current().map(|p| p.port()), Some(2000));
    }

    #[test]
    fn repeated_identical_failures_are_reported_once() {
        let mut d = Discoverer::new(Scripted::new(vec![
            malformed("bad"),
            malformed("bad"),
            malformed("worse"),
            Ok(Some(params(1000))),
        ]));
        assert_eq!(
            drain(&mut d, 4),
            vec![
                "failure:malformed credentials: bad",
                "failure:malformed credentials: worse",
                "connected:1000",
            ]
        );
    }

    #[test]
    fn failure_while_connected_disconnects_first() {
        let mut d = Discoverer::new(Scripted::new(vec![Ok(Some(params(1000))), malformed("gone")]));
        assert_eq!(
            drain(&mut d, 2),
            vec![
                "connected:1000",
                "disconnected",
                "failure:malformed credentials: gone"
            ]
        );
        assert!(d.current().is_none());
    }

    #[test]
    fn wait_blocks_until_the_client_appears() {
        let mut d = Discoverer::with_interval(
            Scripted::new(vec![Ok(None), Ok(None), Ok(Some(params(1234)))]),
            Duration::from_millis(1),
        );
        match d.next() {
            Some(ConnectionEvent::Connected(p)) => assert_eq!(p.port(), 1234),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn chain_prefers_a_live_client_over_an_earlier_failure() {
        let mut chain = ChainSource::new(vec![
            Box::new(Scripted::new(vec![malformed("broken")])),
            Box::new(Scripted::new(vec![Ok(Some(params(7)))])),
        ]);
        assert_eq!(chain.probe().unwrap().map(|p| p.port()), Some(7));

        let mut chain = ChainSource::new(vec![
            Box::new(Scripted::new(vec![Ok(None)])),
            Box::new(Scripted::new(vec![malformed("broken")])),
        ]);
        assert!(matches!(chain.probe(), Err(DiscoveryError::Malformed(_))));
    }

    #[test]
    fn command_line_carries_install_directory_and_credentials() {
        let args = [
            "LeagueClientUx.exe",
            "--app-port=50000",
            "--remoting-auth-token=abc",
            "\"--install-directory=C:/Riot Games/League of Legends\"",
        ];
        let parsed = parse_client_command_line(&args).unwrap();
        assert_eq!(
            parsed.install_directory,
            Some(PathBuf::from("C:/Riot Games/League of Legends"))
        );
        assert_eq!(parsed.credentials.map(|p| p.port()), Some(50000));
    }

    #[test]
    fn command_line_credentials_without_install_directory() {
        let args = ["LeagueClientUx", "--remoting-auth-token=abc", "--app-port=50000"];
        let parsed = parse_client_command_line(&args).unwrap();
        assert_eq!(parsed.install_directory, None);
        let p = parsed.credentials.unwrap();
        assert_eq!(p.port(), 50000);
        assert_eq!(p.password(), "abc");
        assert_eq!(p.username(), "riot");
        assert_eq!(p.scheme(), Scheme::Https);

        assert_eq!(
            parse_client_command_line(&["LeagueClientUx"]).unwrap(),
            ClientCommandLine::default()
        );
        assert!(parse_client_command_line(&["--app-port=nope", "--remoting-auth-token=t"]).is_err());
    }

    #[test]
    fn lockfile_in_install_directory_wins_over_arguments() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(LOCKFILE_NAME), "LeagueClient:1:61000:fromfile:https").unwrap();
        let command_line = ClientCommandLine {
            install_directory: Some(dir.path().to_path_buf()),
            credentials: Some(params(50000)),
        };
        let resolved = command_line.resolve().unwrap().unwrap();
        assert_eq!(resolved.port(), 61000);
        assert_eq!(resolved.password(), "fromfile");
    }

    #[test]
    fn missing_lockfile_falls_back_to_arguments() {
        let dir = tempfile::TempDir::new().unwrap();
        let command_line = ClientCommandLine {
            install_directory: Some(dir.path().to_path_buf()),
            credentials: Some(params(50000)),
        };
        assert_eq!(command_line.resolve().unwrap().map(|p| p.port()), Some(50000));

        let without_arguments = ClientCommandLine {
            install_directory: Some(dir.path().to_path_buf()),
            credentials: None,
        };
        assert!(without_arguments.resolve().unwrap().is_none());
    }
}
