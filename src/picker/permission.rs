use super::media::{MediaSource, MediaType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Camera,
    Microphone,
    Library,
}

impl Capability {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::Library => "library",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

/// What to do next before presenting a capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Proceed,
    Request(Capability),
    Deny(Capability),
}

/// Capabilities a capture from `source` needs. The microphone is only needed
/// when video is among the requested kinds.
pub fn required_capabilities(source: MediaSource, kinds: &[MediaType]) -> Vec<Capability> {
    match source {
        MediaSource::Library => vec![Capability::Library],
        MediaSource::Camera if kinds.contains(&MediaType::Video) => {
            vec![Capability::Camera, Capability::Microphone]
        }
        MediaSource::Camera => vec![Capability::Camera],
    }
}

/// Decides the next step from the current status of each required capability.
///
/// Any denial wins over pending requests. A capability that is still
/// undetermined after it was already requested once counts as denied.
pub fn access_decision(
    statuses: &[(Capability, AuthorizationStatus)],
    already_requested: &[Capability],
) -> AccessDecision {
    if let Some((capability, _)) = statuses
        .iter()
        .find(|(_, status)| *status == AuthorizationStatus::Denied)
    {
        return AccessDecision::Deny(*capability);
    }
    match statuses
        .iter()
        .find(|(_, status)| *status == AuthorizationStatus::Undetermined)
    {
        Some((capability, _)) if already_requested.contains(capability) => {
            AccessDecision::Deny(*capability)
        }
        Some((capability, _)) => AccessDecision::Request(*capability),
        None => AccessDecision::Proceed,
    }
}
