// Output-parsing rules for the external tools, pinned against
// procps-ng `free`, POSIX `df -P`, iproute2 `ss` and net-tools
// `netstat` on a reference Linux box. Column positions and header
// line counts live here as constants rather than being inferred.

/// `ss -tuln` prints one header line before the socket rows.
pub const SS_HEADER_LINES: usize = 1;

/// `netstat -tuln` prints two header lines before the socket rows.
pub const NETSTAT_HEADER_LINES: usize = 2;

/// Row label for the physical-memory line of `free -m`.
pub const FREE_MEM_ROW_PREFIX: &str = "Mem:";

/// Zero-based field index of the "available" column in the `Mem:` row
/// (`Mem: total used free shared buff/cache available`).
pub const FREE_AVAILABLE_COLUMN: usize = 6;

/// Zero-based field index of the `Capacity` column of `df -P`
/// (`Filesystem 1024-blocks Used Available Capacity Mounted on`).
pub const DF_CAPACITY_COLUMN: usize = 4;

/// Counts listening-socket rows after the tool's header lines.
/// Tolerant by design: unknown row shapes still count, blank lines do not.
pub fn count_socket_lines(output: &str, header_lines: usize) -> u64 {
    output
        .lines()
        .skip(header_lines)
        .filter(|line| !line.trim().is_empty())
        .count() as u64
}

/// Extracts available memory in MB from `free -m` output.
pub fn free_available_mb(output: &str) -> Result<u64, String> {
    let row = output
        .lines()
        .find(|line| line.starts_with(FREE_MEM_ROW_PREFIX))
        .ok_or_else(|| format!("no '{FREE_MEM_ROW_PREFIX}' row in free output"))?;
    let field = row
        .split_whitespace()
        .nth(FREE_AVAILABLE_COLUMN)
        .ok_or_else(|| format!("'{FREE_MEM_ROW_PREFIX}' row has no available column"))?;
    field
        .parse::<u64>()
        .map_err(|_| format!("available column is not an integer: '{field}'"))
}

/// Extracts root-filesystem usage percent from `df -P /` output.
pub fn df_usage_pct(output: &str) -> Result<u8, String> {
    let row = output
        .lines()
        .nth(1)
        .ok_or_else(|| "df output has no data line".to_string())?;
    let field = row
        .split_whitespace()
        .nth(DF_CAPACITY_COLUMN)
        .ok_or_else(|| "df data line has no capacity column".to_string())?;
    let digits = field
        .strip_suffix('%')
        .ok_or_else(|| format!("capacity column is not a percentage: '{field}'"))?;
    let pct = digits
        .parse::<u8>()
        .map_err(|_| format!("capacity column is not a percentage: '{field}'"))?;
    if pct > 100 {
        return Err(format!("capacity out of range: {pct}%"));
    }
    Ok(pct)
}
