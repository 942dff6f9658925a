use serde::{Deserialize, Serialize};

/// A device in an user's account that may be used for playback.
#[derive(Debug, Clone, Eq, Deserialize)]
pub struct Device {
    name: String,
    // restricted devices may not have an ID
    id: Option<String>,
    volume_percent: Option<u8>,
    is_active: bool,
    #[serde(default)]
    is_private_session: bool,
    is_restricted: bool,
    #[serde(rename = "type")]
    device_type: DeviceType,
}

/// A device's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DeviceType {
    Computer,
    Tablet,
    Smartphone,
    Speaker,
    TV,
    AVR,
    STB,
    AudioDongle,
    GameConsole,
    CastVideo,
    CastAudio,
    Automobile,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Devices {
    pub devices: Vec<Device>,
}

/// Body of the playback transfer request.
#[derive(Debug, Serialize)]
pub(crate) struct TransferPlaybackBody<'a> {
    pub device_ids: [&'a str; 1],
    pub play: bool,
}

impl Device {
    /// The name of the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The device ID.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The current volume as a percentage between 0 and 100 inclusive.
    pub fn volume_percent(&self) -> Option<u8> {
        self.volume_percent
    }

    /// If this device is the currently active device.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// If this device is currently in a private session.
    pub fn is_private_session(&self) -> bool {
        self.is_private_session
    }

    /// Whether controlling this device is restricted. If this is `true`, no Web API commands will be accepted by this
    /// device.
    pub fn is_restricted(&self) -> bool {
        self.is_restricted
    }

    /// The type of the device.
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}
