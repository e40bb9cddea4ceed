//! GitHub Actions workflow-command helpers
//!
//! When running inside a workflow, long steps are folded into collapsible log groups and
//! fatal errors are surfaced as annotations. Outside Actions the same calls degrade to
//! styled console headers.

use console::style;

/// Whether the process runs as a GitHub Actions step
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Run `f` inside a collapsible log group named `name`.
///
/// The group is closed on every exit path of `f`.
pub fn group<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let actions = in_github_actions();
    if actions {
        println!("::group::{}", name);
    } else {
        println!("\n{}", style(name).bold());
    }

    struct EndGroup(bool);
    impl Drop for EndGroup {
        fn drop(&mut self) {
            if self.0 {
                println!("::endgroup::");
            }
        }
    }
    let _end = EndGroup(actions);

    f()
}

/// Emit an informational message
pub fn info(message: &str) {
    log::info!("{}", message);
    println!("{}", message);
}

/// Emit an `::error::` annotation when running inside Actions
pub fn error_annotation(message: &str) {
    if in_github_actions() {
        println!("::error::{}", escape_data(message));
    }
}

/// Escape a message for use as workflow-command data
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
