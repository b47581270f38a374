// ─── Startup Script ───
// Generates the start.sh shipped with the bundle: either a plain java
// invocation or the Aikar GC flag set tuned to the configured heap.

/// Java major required for a game version, keyed by `x.y.z` first and the
/// `x.y` family second. Anything newer than the table wants 21.
const JAVA_VERSION_MAP: [(&str, u32); 6] = [
    ("1.17", 16),
    ("1.18", 17),
    ("1.19", 17),
    ("1.20", 17),
    ("1.20.5", 21),
    ("1.21", 21),
];

pub fn java_major_for(version: &str) -> u32 {
    let mut parts = version.split('.');
    let first = parts.next().unwrap_or("0");
    let second = parts.next().unwrap_or("0");
    let third = parts.next().unwrap_or("0");

    let family = format!("{}.{}", first, second);
    let full = format!("{}.{}.{}", first, second, third);

    lookup(&full).or_else(|| lookup(&family)).unwrap_or(21)
}

fn lookup(key: &str) -> Option<u32> {
    JAVA_VERSION_MAP
        .iter()
        .find(|(version, _)| *version == key)
        .map(|(_, major)| *major)
}

/// Aikar's recommended G1 flag set, tuned by heap size. Above 12288 MB the
/// high-memory variant applies (larger regions, higher reserve).
pub fn aikar_flags(ram_mb: u32, java_major: u32, jar_name: &str) -> String {
    let ram = format!("{}M", ram_mb);

    let high_mem = ram_mb > 12288;
    let survivor_ratio = if high_mem { 32 } else { 8 };
    let region_size = if high_mem { "16M" } else { "8M" };
    let reserve_percent = if high_mem { 20 } else { 15 };
    let initiating_occupancy = if high_mem { 20 } else { 15 };

    let flags = [
        format!("java -Xms{} -Xmx{}", ram, ram),
        "--add-modules=jdk.incubator.vector".to_string(),
        "-XX:+UseG1GC".to_string(),
        "-XX:+ParallelRefProcEnabled".to_string(),
        "-XX:MaxGCPauseMillis=200".to_string(),
        "-XX:+UnlockExperimentalVMOptions".to_string(),
        "-XX:+DisableExplicitGC".to_string(),
        "-XX:+AlwaysPreTouch".to_string(),
        "-XX:G1NewSizePercent=30".to_string(),
        "-XX:G1MaxNewSizePercent=40".to_string(),
        format!("-XX:G1HeapRegionSize={}", region_size),
        format!("-XX:G1ReservePercent={}", reserve_percent),
        "-XX:G1HeapWastePercent=5".to_string(),
        "-XX:G1MixedGCCountTarget=4".to_string(),
        format!("-XX:InitiatingHeapOccupancyPercent={}", initiating_occupancy),
        "-XX:G1MixedGCLiveThresholdPercent=90".to_string(),
        "-XX:G1RSetUpdatingPauseTimePercent=5".to_string(),
        format!("-XX:SurvivorRatio={}", survivor_ratio),
        "-XX:+PerfDisableSharedMem".to_string(),
        "-XX:MaxTenuringThreshold=1".to_string(),
        "-Dusing.aikars.flags=https://mcflags.emc.gs".to_string(),
        "-Daikars.new.flags=true".to_string(),
        format!("-jar {} nogui", jar_name),
    ];

    // The vector module only exists from Java 16 on.
    let kept: Vec<&String> = flags
        .iter()
        .filter(|f| java_major >= 16 || !f.starts_with("--add-modules"))
        .collect();

    kept.iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(" \\\n  ")
}

/// Assemble the full start.sh contents for the chosen version and heap.
pub fn startup_script(chosen_version: &str, ram_mb: u32, use_aikar_flags: bool) -> String {
    if chosen_version.is_empty() {
        return "#!/bin/bash\njava -jar server.jar nogui".to_string();
    }

    if use_aikar_flags {
        let flags = aikar_flags(ram_mb, java_major_for(chosen_version), "server.jar");
        return format!("#!/bin/bash\n{}", flags);
    }

    format!(
        "#!/bin/bash\njava -Xms{}M -Xmx{}M -jar server.jar nogui",
        ram_mb, ram_mb
    )
}
