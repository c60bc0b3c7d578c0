//! Platform API probes
//!
//! Presence checks on the navigator object. None are critical.

use super::{Probe, ProbeCategory, ProbeError};
use crate::host::BrowserEnvironment;

pub const PLATFORM_PROBES: [Probe; 5] = [
    Probe::new(
        "service-worker",
        ProbeCategory::PlatformApi,
        false,
        "Service workers",
        service_worker,
    ),
    Probe::new(
        "web-share",
        ProbeCategory::PlatformApi,
        false,
        "Web Share",
        web_share,
    ),
    Probe::new(
        "clipboard-api",
        ProbeCategory::PlatformApi,
        false,
        "Async clipboard",
        clipboard_api,
    ),
    Probe::new(
        "media-devices",
        ProbeCategory::PlatformApi,
        false,
        "Media devices",
        media_devices,
    ),
    Probe::new(
        "geolocation",
        ProbeCategory::PlatformApi,
        false,
        "Geolocation",
        geolocation,
    ),
];

fn service_worker(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.navigator_has("serviceWorker"))
}

fn web_share(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.navigator_has("share"))
}

fn clipboard_api(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.navigator_has("clipboard"))
}

fn media_devices(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.navigator_has("mediaDevices"))
}

fn geolocation(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    Ok(env.navigator_has("geolocation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticEnvironment;

    #[test]
    fn test_navigator_members() {
        let members = [
            ("serviceWorker", "service-worker"),
            ("share", "web-share"),
            ("clipboard", "clipboard-api"),
            ("mediaDevices", "media-devices"),
            ("geolocation", "geolocation"),
        ];

        for (member, name) in members {
            let env = StaticEnvironment::modern().without_navigator(member);
            for probe in &PLATFORM_PROBES {
                assert_eq!((probe.predicate)(&env).unwrap(), probe.name != name);
            }
        }
    }
}
