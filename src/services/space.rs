//! Free space queries for the destination volume, with platform-specific
//! implementations

use std::io;
use std::path::Path;

/// Reports the bytes available to this process on the volume holding a path.
pub trait VolumeSpace: Send + Sync {
    fn available_space(&self, path: &Path) -> io::Result<u64>;
}

/// Queries the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVolume;

impl VolumeSpace for SystemVolume {
    fn available_space(&self, path: &Path) -> io::Result<u64> {
        // The destination root may not exist yet; ask about its closest
        // existing ancestor, which lives on the same volume.
        let probe = path
            .ancestors()
            .find(|candidate| candidate.exists())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no existing ancestor for {}", path.display()),
                )
            })?;

        let available = available_space_for(probe)?;
        log::debug!("Available space on {}: {available} bytes", probe.display());
        Ok(available)
    }
}

/// Reports a fixed amount regardless of path.
#[derive(Debug, Clone, Copy)]
pub struct FixedSpace(pub u64);

impl VolumeSpace for FixedSpace {
    fn available_space(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

/// Unprivileged free space (Unix): available blocks times fragment size
#[cfg(unix)]
fn available_space_for(path: &Path) -> io::Result<u64> {
    let stat = rustix::fs::statvfs(path).map_err(io::Error::from)?;
    Ok(stat.f_bavail.saturating_mul(stat.f_frsize))
}

/// Free space available to the caller (Windows), via `GetDiskFreeSpaceExW`
#[cfg(windows)]
fn available_space_for(path: &Path) -> io::Result<u64> {
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;

    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut available: u64 = 0;
    let status = unsafe {
        GetDiskFreeSpaceExW(
            wide.as_ptr(),
            &mut available,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };

    if status == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(available)
}

#[cfg(not(any(unix, windows)))]
fn available_space_for(_path: &Path) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "free space query is not supported on this platform",
    ))
}
