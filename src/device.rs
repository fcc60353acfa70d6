use std::env;

/// Coarse device classification, reported only to the access log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Tablet,
    Phone,
    Desktop,
}

impl DeviceClass {
    /// Name sent in the `dispositivo` log parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Tablet => "Tablet",
            DeviceClass::Phone => "Celular",
            DeviceClass::Desktop => "Computador",
        }
    }

    /// Classify a user-agent-like string. Tablet markers win over phone
    /// markers; Android without "mobi" counts as a tablet.
    pub fn from_user_agent(ua: &str) -> Self {
        let lower = ua.to_lowercase();
        let tablet = ["tablet", "ipad", "playbook", "silk"]
            .iter()
            .any(|m| lower.contains(m))
            || android_without_mobi(&lower);
        if tablet {
            return DeviceClass::Tablet;
        }

        // Phone markers are matched case-sensitively.
        const PHONE: &[&str] = &[
            "Mobile", "Android", "iPhone", "iPod", "IEMobile", "BlackBerry", "Kindle",
            "Silk-Accelerated", "hpwOS", "webOS", "Opera Mobi", "Opera Mini",
        ];
        if PHONE.iter().any(|m| ua.contains(m)) {
            DeviceClass::Phone
        } else {
            DeviceClass::Desktop
        }
    }

    /// Derive the class once at startup. `SOCORRO_USER_AGENT` wins; a
    /// Termux session reports as an Android phone.
    pub fn detect() -> Self {
        if let Ok(ua) = env::var("SOCORRO_USER_AGENT") {
            return Self::from_user_agent(&ua);
        }
        if env::var_os("TERMUX_VERSION").is_some() {
            return Self::from_user_agent("Linux; Android; Mobile");
        }
        Self::from_user_agent(env::consts::OS)
    }
}

fn android_without_mobi(lower: &str) -> bool {
    match lower.find("android") {
        Some(idx) => !lower[idx..].contains("mobi"),
        None => false,
    }
}
