use crate::capability::{CapabilityError, CapabilityProvider, LocalCapability};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::{EventMap, SessionEvent};
use crate::session::{NegotiationState, SessionInput};
use crate::transport::{
    ConnectivityState, DataChannel, PeerTransport, TransportEvent, TransportEventSink,
    TransportFactory,
};
use speek_core::transfer::{Frame, OutboundTransfer, Reassembler, Reception, TransferError};
use speek_core::{
    ConnectivityCandidate, DescriptionKind, MeetingId, ParticipantId, SessionDescription,
    SignalChannel, SignalMessage, SignalPayload,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Collaborators a session is built from.
#[derive(Clone)]
pub struct SessionDeps {
    pub signal: Arc<dyn SignalChannel>,
    pub transports: Arc<dyn TransportFactory>,
    pub capabilities: Arc<dyn CapabilityProvider>,
}

/// Per-participant negotiation state machine.
///
/// Owns the peer transport, its data channels and all transfers of one
/// session. Every input goes through [`handle`](Self::handle); asynchronous
/// work started here (capability acquisition, timeouts, transport callbacks)
/// reports back through the input channel handed to [`Negotiator::new`].
pub struct Negotiator {
    identity: ParticipantId,
    config: SessionConfig,
    deps: SessionDeps,
    events: EventMap,
    inputs: mpsc::UnboundedSender<SessionInput>,
    state: NegotiationState,
    state_tx: watch::Sender<NegotiationState>,
    generation: u64,

    meeting_id: Option<MeetingId>,
    remote_id: Option<ParticipantId>,
    signal_task: Option<JoinHandle<()>>,
    timeout_task: Option<JoinHandle<()>>,

    transport: Option<Arc<dyn PeerTransport>>,
    capability: Option<LocalCapability>,
    outbound_channel: Option<Arc<dyn DataChannel>>,
    outbound_open: bool,

    local_offer: Option<SessionDescription>,
    remote_description_applied: bool,
    pending_offer: Option<(ParticipantId, SessionDescription)>,
    deferred_candidates: Vec<(ParticipantId, ConnectivityCandidate)>,

    uploads: VecDeque<OutboundTransfer>,
    reassembler: Reassembler,
}

impl Negotiator {
    pub fn new(
        identity: ParticipantId,
        config: SessionConfig,
        deps: SessionDeps,
        events: EventMap,
        inputs: mpsc::UnboundedSender<SessionInput>,
    ) -> Self {
        let (state_tx, _) = watch::channel(NegotiationState::Idle);
        let reassembler = Reassembler::new(config.chunk_size);

        Self {
            identity,
            config,
            deps,
            events,
            inputs,
            state: NegotiationState::Idle,
            state_tx,
            generation: 0,
            meeting_id: None,
            remote_id: None,
            signal_task: None,
            timeout_task: None,
            transport: None,
            capability: None,
            outbound_channel: None,
            outbound_open: false,
            local_offer: None,
            remote_description_applied: false,
            pending_offer: None,
            deferred_candidates: Vec::new(),
            uploads: VecDeque::new(),
            reassembler,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<NegotiationState> {
        self.state_tx.subscribe()
    }

    /// Drains `inputs` until the session is closed, pumping queued uploads
    /// whenever no input is waiting.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<SessionInput>) {
        info!("Session event loop started for {}", self.identity);

        loop {
            tokio::select! {
                biased;

                input = inputs.recv() => match input {
                    Some(input) => self.handle(input).await,
                    None => {
                        info!("Input channel closed. Shutting down session.");
                        self.close().await;
                    }
                },

                _ = std::future::ready(()), if self.has_pending_upload() => {
                    self.pump_upload().await;
                }
            }

            if self.state.is_closed() {
                break;
            }
        }

        info!("Session event loop finished for {}", self.identity);
    }

    pub async fn handle(&mut self, input: SessionInput) {
        match input {
            SessionInput::Connect(meeting_id) => self.connect(meeting_id).await,

            SessionInput::CapabilityResolved { generation, result } => {
                if generation != self.generation
                    || self.state != NegotiationState::AwaitingLocalCapability
                {
                    debug!("Dropping stale capability result (generation {})", generation);
                    if let Ok(capability) = result {
                        self.deps.capabilities.release(&capability).await;
                    }
                    return;
                }
                self.on_capability(result).await;
            }

            SessionInput::Signal(message) => self.on_signal(message).await,

            SessionInput::Transport { generation, event } => {
                if generation != self.generation || self.state.is_closed() {
                    debug!("Dropping stale transport event (generation {})", generation);
                    return;
                }
                self.on_transport_event(event).await;
            }

            SessionInput::Upload { id, filename, data } => {
                if self.state.is_closed() {
                    warn!("Upload of {:?} ignored: session closed", filename);
                    return;
                }
                info!("Queued upload {} ({:?}, {} bytes)", id, filename, data.len());
                self.uploads.push_back(OutboundTransfer::new(
                    id,
                    filename,
                    data,
                    self.config.chunk_size,
                ));
            }

            SessionInput::NegotiationTimeout { generation } => {
                if generation != self.generation
                    || matches!(
                        self.state,
                        NegotiationState::Connected | NegotiationState::Closed
                    )
                {
                    return;
                }
                warn!(
                    "Negotiation for {} timed out in state {}",
                    self.identity, self.state
                );
                self.events.dispatch(&SessionEvent::ConnectivityChanged(
                    ConnectivityState::Failed,
                ));
                self.close().await;
            }

            SessionInput::Close => self.close().await,
        }
    }

    /// Releases everything the session owns. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }

        self.generation += 1;

        if let Some(task) = self.signal_task.take() {
            task.abort();
        }
        if let Some(task) = self.timeout_task.take() {
            task.abort();
        }
        if self.meeting_id.is_some() {
            self.deps.signal.leave().await;
        }

        if !self.uploads.is_empty() || self.reassembler.in_progress().is_some() {
            warn!("Abandoning in-flight transfers for {}", self.identity);
        }
        self.uploads.clear();
        self.reassembler.reset();
        self.pending_offer = None;
        self.local_offer = None;
        self.deferred_candidates.clear();

        self.outbound_channel = None;
        self.outbound_open = false;
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Failed to close transport for {}: {}", self.identity, e);
            }
        }
        if let Some(capability) = self.capability.take() {
            self.deps.capabilities.release(&capability).await;
        }

        // Waiters on `Closed` may assume everything above is released.
        self.set_state(NegotiationState::Closed);
        info!("Session {} closed", self.identity);
    }

    pub fn has_pending_upload(&self) -> bool {
        self.outbound_open && !self.uploads.is_empty() && !self.state.is_closed()
    }

    /// Writes the next frame of the oldest queued upload.
    pub async fn pump_upload(&mut self) {
        let Some(channel) = self.outbound_channel.clone() else {
            return;
        };
        let Some(transfer) = self.uploads.front_mut() else {
            return;
        };
        let Some(frame) = transfer.peek_frame() else {
            self.uploads.pop_front();
            return;
        };

        let sent = match &frame {
            Frame::Text(text) => channel.send_text(text).await,
            Frame::Binary(chunk) => channel.send_binary(chunk).await,
        };

        if let Err(e) = sent {
            let id = transfer.id();
            error!("Failed to send frame of upload {}: {}", id, e);
            self.uploads.pop_front();
            self.events.dispatch(&SessionEvent::TransferFailed {
                id: Some(id),
                error: SessionError::Transport(e),
            });
            return;
        }

        if let Some(progress) = transfer.advance() {
            self.events
                .dispatch(&SessionEvent::TransferProgress(progress));
        }

        if transfer.is_complete() {
            let reset = transfer.finish();
            info!("Upload {} ({:?}) complete", reset.id, reset.filename);
            self.uploads.pop_front();
            self.events.dispatch(&SessionEvent::TransferProgress(reset));
        }
    }

    async fn connect(&mut self, meeting_id: MeetingId) {
        if self.state != NegotiationState::Idle {
            warn!("connect({}) ignored in state {}", meeting_id, self.state);
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        info!("Participant {} connecting to meeting {}", self.identity, meeting_id);

        let mut stream = match self.deps.signal.join(&meeting_id, &self.identity).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to join meeting {}: {}", meeting_id, e);
                self.close().await;
                return;
            }
        };
        self.meeting_id = Some(meeting_id);

        let signal_tx = self.inputs.clone();
        self.signal_task = Some(tokio::spawn(async move {
            while let Some(message) = stream.recv().await {
                if signal_tx.send(SessionInput::Signal(message)).is_err() {
                    break;
                }
            }
        }));

        let sink = TransportEventSink::new(generation, self.inputs.clone());
        let transport = match self.deps.transports.create(sink).await {
            Ok(transport) => transport,
            Err(e) => {
                error!("Failed to create transport for {}: {}", self.identity, e);
                self.close().await;
                return;
            }
        };

        match transport
            .create_data_channel(&self.config.data_channel_label)
            .await
        {
            Ok(channel) => self.outbound_channel = Some(channel),
            Err(e) => warn!("Failed to create outbound data channel: {}", e),
        }
        self.transport = Some(transport);

        self.set_state(NegotiationState::AwaitingLocalCapability);

        let capabilities = Arc::clone(&self.deps.capabilities);
        let constraints = self.config.constraints.clone();
        let capability_tx = self.inputs.clone();
        tokio::spawn(async move {
            let result = capabilities.acquire(&constraints).await;
            let unclaimed = capability_tx
                .send(SessionInput::CapabilityResolved { generation, result })
                .err();

            // The session is gone; nobody else will release what was acquired.
            if let Some(mpsc::error::SendError(SessionInput::CapabilityResolved {
                result: Ok(capability),
                ..
            })) = unclaimed
            {
                capabilities.release(&capability).await;
            }
        });

        if let Some(timeout) = self.config.negotiation_timeout {
            let timeout_tx = self.inputs.clone();
            self.timeout_task = Some(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let _ = timeout_tx.send(SessionInput::NegotiationTimeout { generation });
            }));
        }
    }

    async fn on_capability(&mut self, result: Result<LocalCapability, CapabilityError>) {
        let capability = match result {
            Ok(capability) => capability,
            Err(e) => {
                error!("Capability acquisition failed for {}: {}", self.identity, e);
                self.events.dispatch(&SessionEvent::CapabilityError(e));
                self.close().await;
                return;
            }
        };

        self.events
            .dispatch(&SessionEvent::StreamReady(capability.clone()));

        if let Some(transport) = &self.transport {
            if let Err(e) = transport.attach_capability(&capability).await {
                warn!("Failed to attach local tracks: {}", e);
            }
        }
        self.capability = Some(capability);

        match self.pending_offer.take() {
            Some((sender, offer)) => self.answer_offer(sender, offer).await,
            None => self.send_offer().await,
        }
    }

    async fn send_offer(&mut self) {
        self.set_state(NegotiationState::Offering);

        match self.create_local_description(DescriptionKind::Offer).await {
            Ok(offer) => {
                self.local_offer = Some(offer.clone());
                self.emit_signal(SignalPayload::Offer(offer)).await;
            }
            Err(e) => error!("Failed to create offer: {}", e),
        }

        self.set_state(NegotiationState::Negotiating);
    }

    async fn answer_offer(&mut self, sender: ParticipantId, offer: SessionDescription) {
        let Some(transport) = self.transport.clone() else {
            return;
        };
        let settled = if self.state == NegotiationState::Connected {
            NegotiationState::Connected
        } else {
            NegotiationState::Negotiating
        };

        self.set_state(NegotiationState::Answering);

        if let Err(e) = transport.apply_remote_description(&offer).await {
            error!("Failed to apply offer from {}: {}", sender, SessionError::Negotiation(e));
            self.set_state(settled);
            return;
        }
        self.remote_description_applied = true;
        self.bind_remote(&sender);
        self.flush_deferred_candidates().await;

        match self.create_local_description(DescriptionKind::Answer).await {
            Ok(answer) => self.emit_signal(SignalPayload::Answer(answer)).await,
            Err(e) => error!("Failed to answer offer from {}: {}", sender, e),
        }

        self.set_state(settled);
    }

    async fn create_local_description(
        &self,
        kind: DescriptionKind,
    ) -> Result<SessionDescription, SessionError> {
        let transport = self.transport.as_ref().ok_or(SessionError::Closed)?;
        let description = transport
            .create_local_description(kind)
            .await
            .map_err(SessionError::Negotiation)?;
        transport
            .apply_local_description(&description)
            .await
            .map_err(SessionError::Negotiation)?;
        Ok(description)
    }

    async fn on_signal(&mut self, message: SignalMessage) {
        if message.sender_id == self.identity {
            return;
        }
        if self.meeting_id.as_ref() != Some(&message.meeting_id) {
            debug!(
                "Dropping {} for meeting {} (not joined)",
                message.kind_name(),
                message.meeting_id
            );
            return;
        }
        if let Some(remote) = &self.remote_id {
            if remote != &message.sender_id {
                debug!(
                    "Ignoring {} from {} (session bound to {})",
                    message.kind_name(),
                    message.sender_id,
                    remote
                );
                return;
            }
        }
        if matches!(self.state, NegotiationState::Idle | NegotiationState::Closed) {
            return;
        }

        let sender = message.sender_id;
        match message.payload {
            SignalPayload::Offer(offer) => self.on_remote_offer(sender, offer).await,
            SignalPayload::Answer(answer) => self.on_remote_answer(sender, answer).await,
            SignalPayload::Candidate(candidate) => {
                self.on_remote_candidate(sender, candidate).await
            }
        }
    }

    async fn on_remote_offer(&mut self, sender: ParticipantId, offer: SessionDescription) {
        if self.state == NegotiationState::AwaitingLocalCapability {
            if self.pending_offer.is_none() {
                info!("Offer from {} arrived before local capability; answering once ready", sender);
                self.pending_offer = Some((sender, offer));
            }
            return;
        }
        if !self.state.accepts_descriptions() {
            return;
        }

        if let Some(local_offer) = self.local_offer.clone() {
            // Glare: the smaller identity yields and answers the other side's offer.
            // The other side may have joined after our offer went out, so repeat it.
            if self.identity > sender {
                info!("Offer glare with {}: keeping local offer", sender);
                self.emit_signal(SignalPayload::Offer(local_offer)).await;
                return;
            }
            info!("Offer glare with {}: rolling back local offer", sender);
            let Some(transport) = self.transport.clone() else {
                return;
            };
            if let Err(e) = transport.rollback_local_description().await {
                error!("Failed to roll back local offer: {}", e);
                return;
            }
            self.local_offer = None;
        }

        self.answer_offer(sender, offer).await;
    }

    async fn on_remote_answer(&mut self, sender: ParticipantId, answer: SessionDescription) {
        if !self.state.accepts_descriptions() || self.local_offer.is_none() {
            warn!("Unsolicited answer from {}, ignoring", sender);
            return;
        }
        let Some(transport) = self.transport.clone() else {
            return;
        };

        if let Err(e) = transport.apply_remote_description(&answer).await {
            error!("Failed to apply answer from {}: {}", sender, e);
            return;
        }

        self.local_offer = None;
        self.remote_description_applied = true;
        self.bind_remote(&sender);
        self.flush_deferred_candidates().await;
    }

    async fn on_remote_candidate(&mut self, sender: ParticipantId, candidate: ConnectivityCandidate) {
        if !self.remote_description_applied {
            debug!("Deferring ICE candidate from {} until remote description", sender);
            self.deferred_candidates.push((sender, candidate));
            return;
        }
        self.apply_candidate(&sender, &candidate).await;
    }

    async fn apply_candidate(&self, sender: &ParticipantId, candidate: &ConnectivityCandidate) {
        let Some(transport) = &self.transport else {
            return;
        };
        let Err(e) = transport.add_connectivity_candidate(candidate).await else {
            return;
        };
        warn!("{} from {:?}", SessionError::Connectivity(e), sender);
    }

    async fn flush_deferred_candidates(&mut self) {
        let remote = self.remote_id.clone();
        let deferred = std::mem::take(&mut self.deferred_candidates);

        for (sender, candidate) in deferred {
            if remote.as_ref() == Some(&sender) {
                self.apply_candidate(&sender, &candidate).await;
            }
        }
    }

    fn bind_remote(&mut self, sender: &ParticipantId) {
        if self.remote_id.is_none() {
            info!("Session {} bound to remote participant {}", self.identity, sender);
            self.remote_id = Some(sender.clone());
        }
    }

    async fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateDiscovered(candidate) => {
                self.events
                    .dispatch(&SessionEvent::CandidateDiscovered(candidate.clone()));
                self.emit_signal(SignalPayload::Candidate(candidate)).await;
            }

            TransportEvent::ConnectivityChanged(connectivity) => {
                self.events
                    .dispatch(&SessionEvent::ConnectivityChanged(connectivity));
                if connectivity == ConnectivityState::Connected
                    && self.state == NegotiationState::Negotiating
                {
                    info!("Session {} connected", self.identity);
                    self.set_state(NegotiationState::Connected);
                }
            }

            TransportEvent::TrackAdded(track) => {
                self.events.dispatch(&SessionEvent::TrackAdded(track));
            }

            TransportEvent::DataChannelOpen(label) => {
                let is_outbound = self
                    .outbound_channel
                    .as_ref()
                    .is_some_and(|channel| channel.label() == label);
                if !is_outbound {
                    return;
                }
                self.outbound_open = true;
                self.events
                    .dispatch(&SessionEvent::DataChannelReady { label });
            }

            TransportEvent::InboundDataChannel(label) => {
                debug!("Inbound data channel '{}' attached", label);
            }

            TransportEvent::Frame(frame) => self.on_frame(frame),
        }
    }

    fn on_frame(&mut self, frame: Frame) {
        self.events
            .dispatch(&SessionEvent::DataReceived(frame.clone()));

        let open_transfer = self.reassembler.in_progress().map(|progress| progress.id);
        let receptions = match self.reassembler.accept(frame) {
            Ok(receptions) => receptions,
            Err(e) => {
                warn!("Inbound transfer failed: {}", e);
                // A malformed metadata frame leaves the open transfer untouched.
                let id = match &e {
                    TransferError::InvalidMetadata(_) => None,
                    _ => open_transfer,
                };
                self.events.dispatch(&SessionEvent::TransferFailed {
                    id,
                    error: SessionError::TransferIntegrity(e),
                });
                return;
            }
        };

        for reception in receptions {
            match reception {
                Reception::Started(progress) => {
                    debug!(
                        "Receiving {:?} ({:?} bytes)",
                        progress.filename, progress.total
                    );
                }
                Reception::Progress(progress) => {
                    self.events
                        .dispatch(&SessionEvent::TransferProgress(progress));
                }
                Reception::Completed { file, reset } => {
                    info!("Received {:?} ({} bytes)", file.filename, file.data.len());
                    self.events
                        .dispatch(&SessionEvent::TransferProgress(reset));
                    self.events.dispatch(&SessionEvent::FileReceived(file));
                }
                Reception::Abandoned(progress) => {
                    warn!(
                        "Discarding incomplete transfer of {:?} ({} bytes received)",
                        progress.filename, progress.transferred
                    );
                }
            }
        }
    }

    async fn emit_signal(&self, payload: SignalPayload) {
        let Some(meeting_id) = self.meeting_id.clone() else {
            return;
        };
        let message = SignalMessage::new(meeting_id, self.identity.clone(), payload);
        debug!("Sending {} from {}", message.kind_name(), self.identity);

        if let Err(e) = self.deps.signal.emit(message).await {
            error!("Failed to emit signal: {}", e);
        }
    }

    fn set_state(&mut self, state: NegotiationState) {
        if self.state != state {
            debug!("Session {}: {} -> {}", self.identity, self.state, state);
            self.state = state;
            self.state_tx.send_replace(state);
        }
    }
}
