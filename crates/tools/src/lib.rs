//! `tools` crate — the External Tool Adapter.
//!
//! Gives handlers a uniform way to invoke a scanner binary when it is
//! discoverable on `PATH`, and falls back to a realistic mock payload when
//! it is not. Handlers never branch on mock-vs-real: the adapter hides it
//! behind a single [`ToolAdapter::run`] call.

pub mod error;
pub mod mock;

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use error::ToolError;

/// The closed set of scanner tools the adapter knows how to invoke.
///
/// Mirrors the "scanner family" portion of the node-type tag set; `decision`,
/// `email`, and other non-scanner node types never reach this adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Nmap,
    Nikto,
    Gobuster,
    Sqlmap,
    Wpscan,
    SecretScan,
    DependencyCheck,
    SemgrepScan,
    ContainerScan,
    KubeBench,
    IacScan,
    OwaspVulnerabilities,
}

impl ToolKind {
    /// The binary name this tool kind shells out to.
    pub fn binary(self) -> &'static str {
        match self {
            ToolKind::Nmap => "nmap",
            ToolKind::Nikto => "nikto",
            ToolKind::Gobuster => "gobuster",
            ToolKind::Sqlmap => "sqlmap",
            ToolKind::Wpscan => "wpscan",
            ToolKind::SecretScan => "gitleaks",
            ToolKind::DependencyCheck => "dependency-check",
            ToolKind::SemgrepScan => "semgrep",
            ToolKind::ContainerScan => "trivy",
            ToolKind::KubeBench => "kube-bench",
            ToolKind::IacScan => "checkov",
            ToolKind::OwaspVulnerabilities => "zap-cli",
        }
    }

    /// The node-type tag this tool kind corresponds to.
    pub fn tag(self) -> &'static str {
        match self {
            ToolKind::Nmap => "nmap",
            ToolKind::Nikto => "nikto",
            ToolKind::Gobuster => "gobuster",
            ToolKind::Sqlmap => "sqlmap",
            ToolKind::Wpscan => "wpscan",
            ToolKind::SecretScan => "secret-scan",
            ToolKind::DependencyCheck => "dependency-check",
            ToolKind::SemgrepScan => "semgrep-scan",
            ToolKind::ContainerScan => "container-scan",
            ToolKind::KubeBench => "kube-bench",
            ToolKind::IacScan => "iac-scan",
            ToolKind::OwaspVulnerabilities => "owasp-vulnerabilities",
        }
    }

    /// Parse a node-type tag into the corresponding tool kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "nmap" => ToolKind::Nmap,
            "nikto" => ToolKind::Nikto,
            "gobuster" => ToolKind::Gobuster,
            "sqlmap" => ToolKind::Sqlmap,
            "wpscan" => ToolKind::Wpscan,
            "secret-scan" => ToolKind::SecretScan,
            "dependency-check" => ToolKind::DependencyCheck,
            "semgrep-scan" => ToolKind::SemgrepScan,
            "container-scan" => ToolKind::ContainerScan,
            "kube-bench" => ToolKind::KubeBench,
            "iac-scan" => ToolKind::IacScan,
            "owasp-vulnerabilities" => ToolKind::OwaspVulnerabilities,
            _ => return None,
        })
    }

    /// Documented argument template; `{target}` is substituted by the caller.
    fn args(self, target: &str) -> Vec<String> {
        match self {
            ToolKind::Nmap => vec!["-sV".into(), "-T4".into(), target.into()],
            ToolKind::Nikto => vec!["-h".into(), target.into()],
            ToolKind::Gobuster => vec![
                "dir".into(),
                "-u".into(),
                target.into(),
                "-w".into(),
                "/usr/share/wordlists/dirb/common.txt".into(),
            ],
            ToolKind::Sqlmap => vec!["-u".into(), target.into(), "--batch".into()],
            ToolKind::Wpscan => vec!["--url".into(), target.into(), "--no-banner".into()],
            ToolKind::SecretScan => vec![
                "detect".into(),
                "--source".into(),
                target.into(),
                "--no-git".into(),
            ],
            ToolKind::DependencyCheck => {
                vec!["--project".into(), target.into(), "--scan".into(), ".".into()]
            }
            ToolKind::SemgrepScan => vec!["--config".into(), "auto".into(), target.into()],
            ToolKind::ContainerScan => vec!["image".into(), target.into()],
            ToolKind::KubeBench => vec!["run".into(), "--targets".into(), "node".into()],
            ToolKind::IacScan => vec!["-d".into(), target.into()],
            ToolKind::OwaspVulnerabilities => vec!["quick-scan".into(), target.into()],
        }
    }

    /// Exit codes this tool documents as "ran successfully", including the
    /// codes several scanners use to mean "findings present" rather than
    /// "tool itself errored".
    fn success_exit_codes(self) -> &'static [i32] {
        match self {
            ToolKind::Nmap => &[0],
            ToolKind::Nikto => &[0, 1],
            ToolKind::Gobuster => &[0],
            ToolKind::Sqlmap => &[0],
            ToolKind::Wpscan => &[0, 2, 3, 4],
            ToolKind::SecretScan => &[0, 1],
            ToolKind::DependencyCheck => &[0],
            ToolKind::SemgrepScan => &[0, 1],
            ToolKind::ContainerScan => &[0, 1],
            ToolKind::KubeBench => &[0],
            ToolKind::IacScan => &[0, 1],
            ToolKind::OwaspVulnerabilities => &[0, 1, 2],
        }
    }
}

/// Findings extracted (or fabricated, in mock mode) from a tool run.
///
/// These feed the `decision` node's numeric variables without requiring
/// every handler to re-parse free-text tool output.
#[derive(Debug, Clone, Default)]
pub struct ScanFindings {
    pub vulnerabilities_found: u32,
    pub leaked_secrets: u32,
    pub severity_high: u32,
}

/// The result of invoking (or mocking) a scanner tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Combined stdout+stderr, or the fabricated mock payload.
    pub text: String,
    /// True when the binary was absent and a mock payload was substituted.
    pub mocked: bool,
    pub findings: ScanFindings,
}

/// The External Tool Adapter contract.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Whether `tool`'s binary is discoverable on `PATH`.
    async fn exists(&self, tool: ToolKind) -> bool;

    /// Run `tool` against `target`, falling back to a mock payload if the
    /// binary is absent.
    async fn run(&self, tool: ToolKind, target: &str) -> Result<ToolOutput, ToolError>;
}

/// Default adapter: shells out via `tokio::process::Command`, falls back to
/// [`mock`] when the binary can't be found on `PATH`.
#[derive(Debug, Default, Clone)]
pub struct ShellToolAdapter;

impl ShellToolAdapter {
    pub fn new() -> Self {
        Self
    }

    fn find_on_path(binary: &str) -> Option<PathBuf> {
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var).find_map(|dir| {
            let candidate = dir.join(binary);
            candidate.is_file().then_some(candidate)
        })
    }
}

#[async_trait]
impl ToolAdapter for ShellToolAdapter {
    async fn exists(&self, tool: ToolKind) -> bool {
        Self::find_on_path(tool.binary()).is_some()
    }

    async fn run(&self, tool: ToolKind, target: &str) -> Result<ToolOutput, ToolError> {
        let Some(binary_path) = Self::find_on_path(tool.binary()) else {
            info!(tool = tool.tag(), "binary not found on PATH, using mock payload");
            return Ok(mock::generate(tool, target).await);
        };

        let args: Vec<String> = tool.args(target);
        debug!(tool = tool.tag(), ?args, "invoking scanner tool");

        let output = tokio::process::Command::new(&binary_path)
            .args(args.iter().map(OsStr::new))
            .output()
            .await
            .map_err(|e| ToolError::SpawnFailed {
                tool: tool.tag().to_string(),
                message: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let code = output.status.code().unwrap_or(-1);
        if !tool.success_exit_codes().contains(&code) {
            warn!(tool = tool.tag(), code, "tool exited outside documented success set");
            return Err(ToolError::InvocationFailed {
                tool: tool.tag().to_string(),
                code,
                output: combined,
            });
        }

        let findings = heuristic_findings(&combined);
        Ok(ToolOutput {
            text: combined,
            mocked: false,
            findings,
        })
    }
}

/// Best-effort keyword-count heuristic for real tool output.
///
/// Parsing each scanner's actual report format is out of scope; this gives
/// the decision handler *something* numeric to act on for real
/// (non-mocked) runs without it.
fn heuristic_findings(text: &str) -> ScanFindings {
    let lower = text.to_ascii_lowercase();
    let count = |needle: &str| lower.matches(needle).count() as u32;

    ScanFindings {
        vulnerabilities_found: count("cve-") + count("vulnerable"),
        leaked_secrets: count("secret") + count("leaked"),
        severity_high: count("high") + count("critical"),
    }
}

/// Simulated delay used by [`mock::generate`], 1-3s, deterministic per tool
/// so repeated demo runs behave consistently.
pub(crate) fn mock_delay(tool: ToolKind) -> Duration {
    let jitter = (tool.binary().len() as u64 * 137) % 2000;
    Duration::from_millis(1000 + jitter)
}
