//! Network facts: wifi and ethernet interfaces.
//!
//! Interfaces are classified by name; wifi interfaces additionally get
//! their SSID from an external network-status command. The command runs
//! with a bounded timeout and any failure, including an unparseable SSID,
//! silently suppresses that interface's section.

use crate::capability::Capabilities;
use crate::facts::{FactSet, FactValue, Unit};
use crate::snapshot::NetLink;
use regex::Regex;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const NO_ACTIVE_CONNECTION: &str = "no active wifi or ethernet connection detected";

const WIFI_TOKENS: &[&str] = &["wl", "wifi", "wi-fi", "wireless"];
const ETHERNET_TOKENS: &[&str] = &["eth", "enp", "eno", "ens"];

/// How an interface name classifies; `Other` interfaces are never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    Wifi,
    Ethernet,
    Other,
}

pub fn classify(name: &str) -> LinkClass {
    let lower = name.to_lowercase();
    if WIFI_TOKENS.iter().any(|t| lower.contains(t)) {
        LinkClass::Wifi
    } else if ETHERNET_TOKENS.iter().any(|t| lower.contains(t)) {
        LinkClass::Ethernet
    } else {
        LinkClass::Other
    }
}

/// External network-status collaborator: resolves the SSID a wifi
/// interface is associated to, or None.
pub trait WifiStatusSource {
    fn ssid(&self, interface: &str) -> Option<String>;
}

/// Production source: `iw dev <interface> link`, bounded by a timeout so a
/// wedged command cannot stall the whole report.
pub struct IwStatusCommand {
    timeout: Duration,
}

impl IwStatusCommand {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for IwStatusCommand {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl WifiStatusSource for IwStatusCommand {
    fn ssid(&self, interface: &str) -> Option<String> {
        let output = run_with_timeout("iw", &["dev", interface, "link"], self.timeout)?;
        parse_ssid(&output)
    }
}

pub fn collect(
    caps: Capabilities,
    links: &[NetLink],
    wifi: &dyn WifiStatusSource,
) -> Vec<FactSet> {
    let mut sets = Vec::new();
    if caps.management_interface_available {
        for link in links {
            match classify(&link.name) {
                LinkClass::Wifi => {
                    // No parseable SSID suppresses the whole interface.
                    if let Some(ssid) = wifi.ssid(&link.name) {
                        let mut set = FactSet::new();
                        set.push_text("Wifi interface", &link.name);
                        set.push(1, "SSID", FactValue::Text(ssid));
                        set.push(
                            1,
                            "Link speed",
                            FactValue::Quantity {
                                value: link.speed_mbps as f64,
                                unit: Unit::Mbps,
                            },
                        );
                        sets.push(set);
                    } else {
                        debug!("no SSID for {}, section suppressed", link.name);
                    }
                }
                LinkClass::Ethernet => {
                    let mut set = FactSet::new();
                    set.push_text("Ethernet interface", &link.name);
                    set.push(
                        1,
                        "Link speed",
                        FactValue::Quantity {
                            value: link.speed_mbps as f64,
                            unit: Unit::Mbps,
                        },
                    );
                    sets.push(set);
                }
                LinkClass::Other => {}
            }
        }
    }

    if sets.is_empty() {
        vec![FactSet::marker(NO_ACTIVE_CONNECTION)]
    } else {
        sets
    }
}

/// Pull the first SSID field out of network-status command output.
pub(crate) fn parse_ssid(output: &str) -> Option<String> {
    let re = Regex::new(r"SSID\s*:\s*(.+)").unwrap();
    re.captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Run a command, killing it at the deadline. Returns stdout on success,
/// None on spawn failure, non-zero exit or timeout.
fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                let mut output = String::new();
                child.stdout.take()?.read_to_string(&mut output).ok()?;
                return Some(output);
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!("{} timed out after {:?}, killing", program, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                warn!("waiting for {} failed: {}", program, e);
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}
