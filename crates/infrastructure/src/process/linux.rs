use custos_application::ports::ProcessAttribution;
use dashmap::DashMap;
use std::fs;

/// `/proc`-based process attributor (C4). Maps a local TCP port to the owning
/// pid by cross-referencing `/proc/net/tcp{,6}` (port -> socket inode) against
/// `/proc/<pid>/fd/*` (inode -> pid), then resolves the pid's name from
/// `/proc/<pid>/comm`. Names are cached by pid with no invalidation: accurate
/// for the desktop-session lifetime this runs under.
pub struct LinuxProcessAttributor {
    name_cache: DashMap<u32, String>,
}

impl LinuxProcessAttributor {
    pub fn new() -> Self {
        Self {
            name_cache: DashMap::new(),
        }
    }

    pub async fn attribute(&self, local_port: u16) -> ProcessAttribution {
        let port = local_port;
        let cache = self.name_cache.clone();
        tokio::task::spawn_blocking(move || Self::attribute_blocking(port, &cache))
            .await
            .unwrap_or_else(|_| ("unknown".to_string(), 0))
    }

    fn attribute_blocking(local_port: u16, cache: &DashMap<u32, String>) -> ProcessAttribution {
        let Some(inode) = Self::find_inode(local_port) else {
            return ("unknown".to_string(), 0);
        };

        let Some(pid) = Self::find_pid_for_inode(inode) else {
            return ("unknown".to_string(), 0);
        };

        if pid == 0 {
            return ("kernel".to_string(), 0);
        }

        if let Some(name) = cache.get(&pid) {
            return (name.clone(), pid);
        }

        let name = Self::read_comm(pid).unwrap_or_else(|| "unknown".to_string());
        cache.insert(pid, name.clone());
        (name, pid)
    }

    fn find_inode(local_port: u16) -> Option<u64> {
        for path in ["/proc/net/tcp", "/proc/net/tcp6"] {
            if let Some(inode) = Self::scan_proc_net(path, local_port) {
                return Some(inode);
            }
        }
        None
    }

    fn scan_proc_net(path: &str, local_port: u16) -> Option<u64> {
        let contents = fs::read_to_string(path).ok()?;
        for line in contents.lines().skip(1) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let local = fields.get(1)?;
            let (_, port_hex) = local.split_once(':')?;
            let port = u16::from_str_radix(port_hex, 16).ok()?;
            if port == local_port {
                let inode: u64 = fields.get(9)?.parse().ok()?;
                return Some(inode);
            }
        }
        None
    }

    fn find_pid_for_inode(inode: u64) -> Option<u32> {
        let needle = format!("socket:[{inode}]");
        let entries = fs::read_dir("/proc").ok()?;
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(pid_str) = file_name.to_str() else {
                continue;
            };
            let Ok(pid) = pid_str.parse::<u32>() else {
                continue;
            };

            let fd_dir = entry.path().join("fd");
            let Ok(fds) = fs::read_dir(&fd_dir) else {
                continue;
            };

            for fd in fds.flatten() {
                if let Ok(target) = fs::read_link(fd.path()) {
                    if target.to_string_lossy() == needle {
                        return Some(pid);
                    }
                }
            }
        }
        None
    }

    fn read_comm(pid: u32) -> Option<String> {
        fs::read_to_string(format!("/proc/{pid}/comm"))
            .ok()
            .map(|s| s.trim().to_string())
    }
}

impl Default for LinuxProcessAttributor {
    fn default() -> Self {
        Self::new()
    }
}
