//! Fake NVR speaking just enough ISAPI for the probe pipeline, guarded by
//! `qop="auth"` digest authentication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use camaudit_common::models::device::Credential;
use camaudit_common::network::target::Target;
use camaudit_protocols::isapi;

use super::serve;

pub const REALM: &str = "DS-2CD2142FWD";
pub const NONCE: &str = "4d6a41314e7a4d354e5449364d6a67784d7a6735";

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "12345";

pub const DEVICE_INFO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DeviceInfo version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
<deviceName>Warehouse NVR</deviceName>
<model>DS-7608NI-K2</model>
<firmwareVersion>V4.30.085</firmwareVersion>
</DeviceInfo>"#;

pub const TWO_CHANNELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VideoInputChannelList version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
<VideoInputChannel><id>1</id><inputPort>1</inputPort><name>Gate</name><resDesc>1920*1080P</resDesc></VideoInputChannel>
<VideoInputChannel><id>2</id><inputPort>2</inputPort><name>Yard</name><resDesc>NO VIDEO</resDesc></VideoInputChannel>
</VideoInputChannelList>"#;

pub const ONE_CHANNEL_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VideoInputChannelList version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
<VideoInputChannel><id>1</id><inputPort>1</inputPort><name>Camera 01</name><resDesc>1280*720P</resDesc></VideoInputChannel>
</VideoInputChannelList>"#;

pub const PROXY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InputProxyChannelList version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
<InputProxyChannel><id>33</id><name>IPCamera 01</name></InputProxyChannel>
</InputProxyChannelList>"#;

pub const USERS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<UserList version="2.0" xmlns="http://www.hikvision.com/ver20/XMLSchema">
<User><id>1</id><userName>admin</userName><userLevel>Administrator</userLevel></User>
<User><id>2</id><userName>guard</userName><userLevel>Operator</userLevel></User>
</UserList>"#;

const USER_CHECK_XML: &str = "<userCheck><statusValue>200</statusValue><statusString>OK</statusString></userCheck>";
pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// How long a stalled path keeps the client waiting.
pub const STALL: Duration = Duration::from_secs(4);

/// What the fake serves. A `None` read answers 403 once authenticated.
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    pub fingerprint: bool,
    pub device_info: Option<&'static str>,
    pub channels: Option<&'static str>,
    pub proxies: Option<&'static str>,
    pub users: Option<&'static str>,
    /// Path that answers only after [`STALL`].
    pub stall: Option<&'static str>,
}

impl Default for DeviceSpec {
    fn default() -> Self {
        Self {
            fingerprint: true,
            device_info: Some(DEVICE_INFO_XML),
            channels: Some(TWO_CHANNELS_XML),
            proxies: Some(PROXY_XML),
            users: Some(USERS_XML),
            stall: None,
        }
    }
}

struct DeviceState {
    spec: DeviceSpec,
    hits: Mutex<HashMap<String, usize>>,
}

pub struct FakeDevice {
    target: Target,
    state: Arc<DeviceState>,
}

impl FakeDevice {
    pub async fn start(spec: DeviceSpec) -> Self {
        let state = Arc::new(DeviceState {
            spec,
            hits: Mutex::default(),
        });
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let addr = serve(app).await;

        Self {
            target: Target::new(addr.ip().to_string(), addr.port()),
            state,
        }
    }

    pub fn target(&self) -> Target {
        self.target.clone()
    }

    /// Requests received on `path`, authenticated or not.
    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }
}

pub fn valid_credential() -> Credential {
    Credential::new(USERNAME, PASSWORD)
}

async fn handle(State(state): State<Arc<DeviceState>>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_default() += 1;
    let spec = &state.spec;

    if spec.stall == Some(path.as_str()) {
        tokio::time::sleep(STALL).await;
    }

    if path == isapi::FINGERPRINT_ASSET {
        return match spec.fingerprint {
            true => (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], PNG_MAGIC).into_response(),
            false => StatusCode::NOT_FOUND.into_response(),
        };
    }

    let body = match path.as_str() {
        isapi::USER_CHECK => Some(USER_CHECK_XML),
        isapi::DEVICE_INFO => spec.device_info,
        isapi::VIDEO_INPUT_CHANNELS => spec.channels,
        isapi::INPUT_PROXY_CHANNELS => spec.proxies,
        isapi::USERS => spec.users,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    if !authorized(&headers, &path) {
        let challenge = format!("Digest realm=\"{REALM}\", nonce=\"{NONCE}\", qop=\"auth\"");
        return (StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, challenge)]).into_response();
    }

    match body {
        Some(xml) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

fn authorized(headers: &HeaderMap, path: &str) -> bool {
    let Some(params) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Digest "))
    else {
        return false;
    };

    let params = digest_params(params);
    let param = |key: &str| params.get(key).map(String::as_str).unwrap_or_default();

    if param("username") != USERNAME || param("realm") != REALM || param("nonce") != NONCE {
        return false;
    }
    if param("uri") != path {
        return false;
    }

    let ha1 = md5_hex(&format!("{USERNAME}:{REALM}:{PASSWORD}"));
    let ha2 = md5_hex(&format!("GET:{path}"));
    let expected = md5_hex(&format!(
        "{ha1}:{NONCE}:{}:{}:{}:{ha2}",
        param("nc"),
        param("cnonce"),
        param("qop")
    ));

    param("response") == expected
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

/// `key=value` pairs of a digest header, quoted or not.
fn digest_params(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut rest = raw.trim();

    while let Some((key, tail)) = rest.split_once('=') {
        let tail = tail.trim_start();
        let (value, tail) = match tail.strip_prefix('"') {
            Some(quoted) => quoted.split_once('"').unwrap_or((quoted, "")),
            None => tail.split_once(',').unwrap_or((tail, "")),
        };

        params.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        rest = tail.trim_start().trim_start_matches(',').trim_start();
    }

    params
}
