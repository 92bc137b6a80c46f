//! Prompt templates for each AI Adapter operation.

pub fn analyze_code(file_path: &str, content: &str, context: &str) -> String {
    format!(
        "You are a security code reviewer. Analyze the following file for \
         vulnerabilities.\n\nFile: {file_path}\n\nPrior scan context:\n{context}\n\n\
         Source:\n```\n{content}\n```\n\n\
         Describe the single most important vulnerability present, concisely."
    )
}

pub fn generate_security_recommendations(report: &str) -> String {
    format!(
        "You are a security analyst producing an executive report. Summarize \
         the following scan outputs into a concise report for engineering \
         leadership, calling out the most severe findings first.\n\n{report}"
    )
}

pub fn generate_fix(content: &str, vulnerability: &str) -> String {
    format!(
        "You are a secure-coding assistant. The following file has this \
         vulnerability:\n\n{vulnerability}\n\n\
         Rewrite the file to fix the vulnerability. Return ONLY the full \
         corrected file content, no commentary.\n\n```\n{content}\n```"
    )
}

pub fn generate_documentation(target: &str, context: &str) -> String {
    format!(
        "Generate user-facing security documentation summarizing findings for \
         {target}, based on:\n\n{context}"
    )
}

pub fn generate_workflow_json(description: &str) -> String {
    format!(
        "Generate a JSON workflow definition (nodes + edges) for the \
         following security-automation request. Respond with a fenced \
         ```json code block containing only the JSON object.\n\nRequest: {description}"
    )
}
