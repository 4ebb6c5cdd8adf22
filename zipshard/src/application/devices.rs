use std::path::Path;
use sysinfo::Disks;
use zipshard_core::Device;

/// Mount points that belong to the OS, never offered as targets.
const SYSTEM_MOUNTS: &[&str] = &["C:\\", "/", "/boot", "/mnt", "/media"];

pub fn is_system_mount(mount: &Path) -> bool {
    SYSTEM_MOUNTS.iter().any(|s| Path::new(s) == mount)
}

/// Mounted devices with their filesystem label, system mounts excluded.
pub fn connected_devices() -> Vec<Device> {
    let disks = Disks::new_with_refreshed_list();
    let mut out: Vec<Device> = disks
        .list()
        .iter()
        .filter(|d| !is_system_mount(d.mount_point()) && d.mount_point().exists())
        .map(|d| {
            Device::new(
                d.mount_point(),
                d.file_system().to_string_lossy().to_ascii_uppercase(),
            )
        })
        .collect();
    out.dedup_by(|a, b| a.mount_point == b.mount_point);
    out
}
