const PRETTY_ENV: &str = "MAILFORM_LOG_PRETTY";

fn main() {
    println!("cargo::rustc-check-cfg=cfg(pretty_logs)");
    println!("cargo::rerun-if-env-changed={PRETTY_ENV}");
    if matches!(std::env::var(PRETTY_ENV).as_deref(), Ok("1" | "true")) {
        println!("cargo::rustc-cfg=pretty_logs");
    }
}
