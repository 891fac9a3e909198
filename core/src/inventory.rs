//! # Inventory Extractor
//!
//! Authenticated reads of the device's management API, each projected from
//! the vendor XML into the canonical record types.
//!
//! Every read is independent and best-effort: a non-200, a transport error
//! or an unparsable payload yields the empty result for that read only, and
//! a missing element degrades just that field to `None`.

use camaudit_common::models::device::{
    ChannelSource, Credential, DeviceInfo, PROXY_RESOLUTION, UserAccount, VideoChannel,
};
use camaudit_common::network::target::Target;
use camaudit_protocols::http::DeviceClient;
use camaudit_protocols::isapi::{self, element};
use camaudit_protocols::xml::{XmlError, XmlParser, XmlValue};
use tracing::debug;

/// Everything the extractor managed to read from one device.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub device_info: Option<DeviceInfo>,
    /// Direct channels followed by proxy channels.
    pub channels: Vec<VideoChannel>,
    pub users: Vec<UserAccount>,
}

/// Runs the four reads concurrently. Field order of the result is fixed
/// regardless of which read finishes first.
pub async fn extract(client: &DeviceClient, target: &Target, credential: &Credential) -> Inventory {
    let (device_info, mut channels, proxies, users) = tokio::join!(
        device_info(client, target, credential),
        direct_channels(client, target, credential),
        proxy_channels(client, target, credential),
        users(client, target, credential),
    );

    channels.extend(proxies);

    Inventory {
        device_info,
        channels,
        users,
    }
}

pub async fn device_info(
    client: &DeviceClient,
    target: &Target,
    credential: &Credential,
) -> Option<DeviceInfo> {
    let body = fetch(client, target, credential, isapi::DEVICE_INFO).await?;
    parse_device_info(&body)
        .inspect_err(|err| debug!(%target, error = %err, "unreadable device info"))
        .ok()
        .flatten()
}

pub async fn direct_channels(
    client: &DeviceClient,
    target: &Target,
    credential: &Credential,
) -> Vec<VideoChannel> {
    let Some(body) = fetch(client, target, credential, isapi::VIDEO_INPUT_CHANNELS).await else {
        return Vec::new();
    };
    parse_direct_channels(&body).unwrap_or_else(|err| {
        debug!(%target, error = %err, "unreadable video inputs");
        Vec::new()
    })
}

pub async fn proxy_channels(
    client: &DeviceClient,
    target: &Target,
    credential: &Credential,
) -> Vec<VideoChannel> {
    let Some(body) = fetch(client, target, credential, isapi::INPUT_PROXY_CHANNELS).await else {
        return Vec::new();
    };
    parse_proxy_channels(&body).unwrap_or_else(|err| {
        debug!(%target, error = %err, "unreadable proxy channels");
        Vec::new()
    })
}

pub async fn users(client: &DeviceClient, target: &Target, credential: &Credential) -> Vec<UserAccount> {
    let Some(body) = fetch(client, target, credential, isapi::USERS).await else {
        return Vec::new();
    };
    parse_users(&body).unwrap_or_else(|err| {
        debug!(%target, error = %err, "unreadable user list");
        Vec::new()
    })
}

async fn fetch(
    client: &DeviceClient,
    target: &Target,
    credential: &Credential,
    path: &str,
) -> Option<String> {
    match client.get_digest(&target.url(path), credential).await {
        Ok(response) if response.is_ok() => Some(response.body),
        Ok(response) => {
            debug!(%target, path, status = response.status, "read refused");
            None
        }
        Err(err) => {
            debug!(%target, path, error = %err, "read failed");
            None
        }
    }
}

/// `Ok(None)` when the document parses but has no `DeviceInfo` root.
pub fn parse_device_info(xml: &str) -> Result<Option<DeviceInfo>, XmlError> {
    let doc = XmlParser::new().parse(xml)?;

    Ok(doc.get(element::DEVICE_INFO).map(|info| DeviceInfo {
        name: info.text(element::DEVICE_NAME),
        model: info.text(element::MODEL),
        firmware: info.text(element::FIRMWARE_VERSION),
    }))
}

pub fn parse_direct_channels(xml: &str) -> Result<Vec<VideoChannel>, XmlError> {
    let doc = XmlParser::new()
        .force_list([element::VIDEO_INPUT_CHANNEL])
        .parse(xml)?;

    let channels = items(&doc, element::VIDEO_INPUT_CHANNEL_LIST, element::VIDEO_INPUT_CHANNEL)
        .iter()
        .map(|ch| VideoChannel {
            id: ch.text(element::ID),
            name: ch.text(element::NAME),
            resolution: ch.text(element::RES_DESC),
            source: ChannelSource::Direct,
        })
        .collect();

    Ok(channels)
}

pub fn parse_proxy_channels(xml: &str) -> Result<Vec<VideoChannel>, XmlError> {
    let doc = XmlParser::new()
        .force_list([element::INPUT_PROXY_CHANNEL])
        .parse(xml)?;

    let channels = items(&doc, element::INPUT_PROXY_CHANNEL_LIST, element::INPUT_PROXY_CHANNEL)
        .iter()
        .map(|ch| VideoChannel {
            id: ch.text(element::ID),
            name: ch.text(element::NAME),
            resolution: Some(PROXY_RESOLUTION.to_string()),
            source: ChannelSource::Proxy,
        })
        .collect();

    Ok(channels)
}

pub fn parse_users(xml: &str) -> Result<Vec<UserAccount>, XmlError> {
    let doc = XmlParser::new().force_list([element::USER]).parse(xml)?;

    let users = items(&doc, element::USER_LIST, element::USER)
        .iter()
        .map(|user| UserAccount {
            id: user.text(element::ID),
            username: user.text(element::USER_NAME),
            level: user.text(element::USER_LEVEL),
        })
        .collect();

    Ok(users)
}

/// The forced list under `<list><item/>...</list>`, empty when either is missing.
fn items<'a>(doc: &'a XmlValue, list: &str, item: &str) -> &'a [XmlValue] {
    doc.path(&[list, item])
        .and_then(XmlValue::as_list)
        .unwrap_or_default()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
