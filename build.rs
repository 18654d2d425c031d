use time::macros::format_description;
use time::OffsetDateTime;

fn main() {
    // Re-run build script when this file changes
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    // Build date (UTC ISO-8601). SOURCE_DATE_EPOCH wins for reproducible builds.
    let built_at = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc);
    let build_date = built_at
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .unwrap_or_else(|_| format!("unix:{}", built_at.unix_timestamp()));
    println!("cargo:rustc-env=ECS_TASK_HELPER_BUILD_DATE={build_date}");

    // Target triple and profile
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=ECS_TASK_HELPER_BUILD_TARGET={target}");

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=ECS_TASK_HELPER_BUILD_PROFILE={profile}");

    // rustc version (best-effort)
    let rustc_ver = rustc_version::version_meta()
        .map(|m| m.short_version_string)
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=ECS_TASK_HELPER_BUILD_RUSTC={rustc_ver}");
}
