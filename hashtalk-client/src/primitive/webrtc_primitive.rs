use crate::error::NegotiationError;
use crate::primitive::{
    ConnectionPrimitive, PeerConnectionState, PrimitiveEvent, PrimitiveFactory,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use hashtalk_core::{IceCandidate, IceServerConfig, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_local::TrackLocal;

pub type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

/// [`ConnectionPrimitive`] backed by a webrtc-rs peer connection.
pub struct WebRtcPrimitive {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcPrimitive {
    /// Build a peer connection whose callbacks feed `events`.
    pub async fn new(
        ice_servers: &[IceServerConfig],
        receive_media: bool,
        events: mpsc::UnboundedSender<PrimitiveEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    if let Some(state) = map_state(s) {
                        let _ = tx.send(PrimitiveEvent::ConnectionState(state));
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(PrimitiveEvent::LocalCandidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                }));
            })
        }));

        let track_tx = events;
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                debug!("Remote track {} ({})", track.id(), track.kind());
                let _ = tx.send(PrimitiveEvent::Track {
                    id: track.id(),
                    kind: track.kind().to_string(),
                });
            })
        }));

        // Without m-lines in the offer the remote side has nowhere to send media.
        if receive_media {
            for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
                let init = RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Recvonly,
                    send_encodings: vec![],
                };
                peer_connection
                    .add_transceiver_from_kind(kind, Some(init))
                    .await
                    .with_context(|| format!("Failed to add {} recv transceiver", kind))?;
            }
        }

        Ok(Self { peer_connection })
    }
}

fn map_state(s: RTCPeerConnectionState) -> Option<PeerConnectionState> {
    match s {
        RTCPeerConnectionState::New => Some(PeerConnectionState::New),
        RTCPeerConnectionState::Connecting => Some(PeerConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(PeerConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(PeerConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(PeerConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(PeerConnectionState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, NegotiationError> {
    let rtc = match desc.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(rtc)
}

#[async_trait]
impl ConnectionPrimitive for WebRtcPrimitive {
    type Track = LocalTrack;

    async fn create_offer(&mut self) -> Result<SessionDescription, NegotiationError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(
        &mut self,
        _remote: &SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            ..Default::default()
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn add_track(&mut self, track: LocalTrack) -> Result<(), NegotiationError> {
        self.peer_connection.add_track(track).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), NegotiationError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Creates [`WebRtcPrimitive`]s with a fixed set of local tracks.
#[derive(Clone, Default)]
pub struct WebRtcFactory {
    receive_media: bool,
    local_tracks: Vec<LocalTrack>,
}

impl WebRtcFactory {
    pub fn new(receive_media: bool) -> Self {
        Self {
            receive_media,
            local_tracks: Vec::new(),
        }
    }

    /// Send `track` on every connection this factory creates.
    ///
    /// For applications embedding the client with a capture source. The
    /// `hashtalk join` participant only receives.
    pub fn with_track(mut self, track: LocalTrack) -> Self {
        self.local_tracks.push(track);
        self
    }
}

#[async_trait]
impl PrimitiveFactory for WebRtcFactory {
    type Primitive = WebRtcPrimitive;

    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<PrimitiveEvent>,
    ) -> Result<WebRtcPrimitive, NegotiationError> {
        let mut primitive = WebRtcPrimitive::new(ice_servers, self.receive_media, events).await?;
        for track in &self.local_tracks {
            primitive.add_track(Arc::clone(track)).await?;
        }
        Ok(primitive)
    }
}
