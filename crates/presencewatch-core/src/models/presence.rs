//! 프레즌스 / 부재(out of office) / 시계 보정 모델.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 프레즌스 정의 조회 응답의 항목
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDefinition {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub language_labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub system_presence: Option<String>,
}

impl PresenceDefinition {
    /// 로케일 라벨 → systemPresence → 빈 문자열 순으로 표시 라벨 결정
    pub fn label(&self, locale: &str) -> String {
        self.language_labels
            .as_ref()
            .and_then(|labels| labels.get(locale))
            .filter(|label| !label.is_empty())
            .or(self.system_presence.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

/// 프레즌스 ID → 표시 라벨
///
/// 한 번 구성한 뒤에는 읽기 전용, 갱신은 통째로 교체한다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceCatalog {
    labels: HashMap<String, String>,
}

impl PresenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 정의 목록으로 카탈로그 구성
    ///
    /// ID가 없거나 라벨이 비는 정의는 넣지 않는다. 조회 시 원시 ID로 표시된다.
    pub fn from_definitions(definitions: &[PresenceDefinition], locale: &str) -> Self {
        definitions
            .iter()
            .filter_map(|def| {
                let id = def.id.as_ref()?;
                let label = def.label(locale);
                (!label.is_empty()).then(|| (id.clone(), label))
            })
            .collect()
    }

    pub fn label(&self, presence_id: &str) -> Option<&str> {
        self.labels.get(presence_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(String, String)> for PresenceCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// 부재(out of office) 기간
///
/// 평가 호출마다 전달되는 일시적인 값, 코어는 저장하지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfOfficeWindow {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub indefinite: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// 서버 시각 − 로컬 시각
///
/// 세션 시작 시 한 번 측정하고 이후 자동으로 다시 계산하지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockOffset(Duration);

impl ClockOffset {
    /// 보정 없음 (로컬 시계 신뢰)
    pub fn zero() -> Self {
        Self(Duration::zero())
    }

    pub fn from_duration(offset: Duration) -> Self {
        Self(offset)
    }

    /// `server - local`
    pub fn between(server: DateTime<Utc>, local: DateTime<Utc>) -> Self {
        Self(server - local)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// 로컬 시각에 보정값을 더한 서버 기준 시각
    pub fn apply(&self, local: DateTime<Utc>) -> DateTime<Utc> {
        local + self.0
    }

    /// 현재 서버 기준 시각
    pub fn server_now(&self) -> DateTime<Utc> {
        self.apply(Utc::now())
    }
}

impl Default for ClockOffset {
    fn default() -> Self {
        Self::zero()
    }
}
