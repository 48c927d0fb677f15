use time::format_description;
use time::OffsetDateTime;

/// Export `name` to the crate, preferring a value already set in the build env.
fn stamp(name: &str, now: OffsetDateTime, format: &str) {
    println!("cargo:rerun-if-env-changed={name}");
    let value = std::env::var(name).unwrap_or_else(|_| {
        format_description::parse(format)
            .ok()
            .and_then(|items| now.format(&items).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env={name}={value}");
}

fn main() {
    let now = OffsetDateTime::now_utc();
    stamp("PT_BUILD_DATE", now, "[month repr:short] [day padding:space] [year]");
    stamp("PT_BUILD_TIME", now, "[hour]:[minute]:[second]");
}
