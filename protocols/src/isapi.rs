//! Paths and element names of the ISAPI management interface exposed by
//! the audited NVR/DVR family.

/// Static UI asset that only this device family serves.
pub const FINGERPRINT_ASSET: &str = "/doc/ui/images/config-icons.png";

/// Returns 200 for any valid credential, whatever its privilege level.
pub const USER_CHECK: &str = "/ISAPI/Security/userCheck";

pub const DEVICE_INFO: &str = "/ISAPI/System/deviceInfo";
pub const VIDEO_INPUT_CHANNELS: &str = "/ISAPI/System/Video/inputs/channels";
pub const INPUT_PROXY_CHANNELS: &str = "/ISAPI/ContentMgmt/InputProxy/channels";
pub const USERS: &str = "/ISAPI/Security/users";

pub mod element {
    pub const DEVICE_INFO: &str = "DeviceInfo";
    pub const DEVICE_NAME: &str = "deviceName";
    pub const MODEL: &str = "model";
    pub const FIRMWARE_VERSION: &str = "firmwareVersion";

    pub const VIDEO_INPUT_CHANNEL_LIST: &str = "VideoInputChannelList";
    pub const VIDEO_INPUT_CHANNEL: &str = "VideoInputChannel";
    pub const INPUT_PROXY_CHANNEL_LIST: &str = "InputProxyChannelList";
    pub const INPUT_PROXY_CHANNEL: &str = "InputProxyChannel";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const RES_DESC: &str = "resDesc";

    pub const USER_LIST: &str = "UserList";
    pub const USER: &str = "User";
    pub const USER_NAME: &str = "userName";
    pub const USER_LEVEL: &str = "userLevel";
}
