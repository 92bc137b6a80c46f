//! Mock payload generation for when a scanner binary is absent.
//!
//! Intentional, not a bug: keeps pipeline demos observable without
//! requiring every scanner to be installed. The `[MOCK]` marker lets the
//! report aggregator disclose it rather than passing fabricated data off
//! as a real scan.

use crate::{mock_delay, ScanFindings, ToolKind, ToolOutput};

/// Produce a realistic fabricated payload for `tool` against `target`.
pub async fn generate(tool: ToolKind, target: &str) -> ToolOutput {
    tokio::time::sleep(mock_delay(tool)).await;

    let (body, findings) = match tool {
        ToolKind::Nmap => (
            format!(
                "Starting Nmap against {target}\n\
                 PORT     STATE SERVICE VERSION\n\
                 22/tcp   open  ssh     OpenSSH 8.9p1\n\
                 80/tcp   open  http    nginx 1.24.0\n\
                 443/tcp  open  https   nginx 1.24.0\n"
            ),
            ScanFindings::default(),
        ),
        ToolKind::Nikto => (
            format!(
                "- Nikto scan against {target}\n\
                 + Server: nginx/1.24.0\n\
                 + /admin/: Admin login page found.\n\
                 + 2 vulnerable items found\n"
            ),
            ScanFindings { vulnerabilities_found: 2, ..Default::default() },
        ),
        ToolKind::Gobuster => (
            format!(
                "Gobuster dir scan against {target}\n\
                 /admin (Status: 301)\n\
                 /backup (Status: 403)\n\
                 /api (Status: 200)\n"
            ),
            ScanFindings::default(),
        ),
        ToolKind::Sqlmap => (
            format!(
                "sqlmap scan of {target}\n\
                 Parameter 'id' is vulnerable. Type: boolean-based blind\n\
                 1 vulnerable parameter found\n"
            ),
            ScanFindings { vulnerabilities_found: 1, ..Default::default() },
        ),
        ToolKind::Wpscan => (
            format!(
                "WPScan against {target}\n\
                 [+] WordPress version 6.4.2 identified\n\
                 [!] 3 vulnerable plugins found\n"
            ),
            ScanFindings { vulnerabilities_found: 3, ..Default::default() },
        ),
        ToolKind::SecretScan => (
            format!(
                "Secret scan of {target}\n\
                 [leaked] AWS_SECRET_ACCESS_KEY found in config/prod.env:14\n\
                 [leaked] private key found in deploy/id_rsa\n"
            ),
            ScanFindings { leaked_secrets: 2, ..Default::default() },
        ),
        ToolKind::DependencyCheck => (
            format!(
                "Dependency-Check report for {target}\n\
                 CVE-2023-44487 (HIGH) in netty-codec-http2 4.1.86\n\
                 CVE-2022-42889 (CRITICAL) in commons-text 1.9\n"
            ),
            ScanFindings { vulnerabilities_found: 2, severity_high: 1, ..Default::default() },
        ),
        ToolKind::SemgrepScan => (
            format!(
                "Semgrep scan of {target}\n\
                 rules.security.sql-injection: 1 finding (HIGH)\n\
                 rules.security.hardcoded-secret: 1 finding\n"
            ),
            ScanFindings { vulnerabilities_found: 2, severity_high: 1, leaked_secrets: 1 },
        ),
        ToolKind::ContainerScan => (
            format!(
                "Trivy image scan of {target}\n\
                 CVE-2024-3094 (CRITICAL) in xz-utils 5.6.0\n\
                 CVE-2023-4911 (HIGH) in glibc 2.37\n"
            ),
            ScanFindings { vulnerabilities_found: 2, severity_high: 2, ..Default::default() },
        ),
        ToolKind::KubeBench => (
            "kube-bench run against node targets\n\
             [FAIL] 1.2.1 Ensure anonymous-auth is disabled\n\
             [PASS] 1.2.2 Ensure --token-auth-file is not set\n"
                .to_string(),
            ScanFindings { vulnerabilities_found: 1, severity_high: 1, ..Default::default() },
        ),
        ToolKind::IacScan => (
            format!(
                "Checkov scan of {target}\n\
                 CKV_AWS_20: S3 bucket is publicly readable — FAILED\n\
                 CKV_AWS_21: S3 bucket versioning disabled — FAILED\n"
            ),
            ScanFindings { vulnerabilities_found: 2, ..Default::default() },
        ),
        ToolKind::OwaspVulnerabilities => (
            format!(
                "OWASP ZAP quick scan of {target}\n\
                 [High] SQL Injection — 1 instance\n\
                 [Medium] Missing Anti-clickjacking Header — 1 instance\n"
            ),
            ScanFindings { vulnerabilities_found: 2, severity_high: 1, ..Default::default() },
        ),
    };

    ToolOutput {
        text: format!("[MOCK] {body}"),
        mocked: true,
        findings,
    }
}
