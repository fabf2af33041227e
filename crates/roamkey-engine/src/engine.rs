//! Handshake engine: frame dispatch, validation chains, reply construction.
//!
//! One [`FtEngine`] per BSS. Over-the-air frames from associated stations
//! enter through [`FtEngine::handle_station_frame`]; frames relayed from
//! other APs enter through [`FtEngine::handle_remote_frame`]. The engine is
//! synchronous; its two mutexes guard the key store and the per-station
//! contexts and are never held across key derivation.
//!
//! # Invariants
//!
//! - A frame targeting another AP is forwarded byte-for-byte, never parsed
//!   beyond the envelope
//! - Store writes happen only after a validation chain fully succeeds
//! - Validation is fail-fast in a fixed order, each step with its own
//!   status code; the MIC check runs last
//! - The PTK is installed exactly once per completed handshake

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use roamkey_crypto::{
    MicInput, PTK_CCMP_LEN, PTK_TKIP_LEN, compute_mic, derive_pmk_r0, derive_pmk_r1,
    derive_pmk_r1_name, derive_ptk, verify_mic, wrap_key,
};
use roamkey_proto::{
    CIPHER_TKIP, FtAction, FtActionFrame, FtElements, FtIe, GtkSubElement, MacAddr, MdIe,
    Rsne, StatusCode, SuiteSelector, mic_zeroed, pad_group_key,
};
use tracing::{debug, warn};

use crate::config::FtConfig;
use crate::env::Environment;
use crate::error::{FtError, ValidationError};
use crate::session::{HandshakeContext, HandshakeState};
use crate::store::{R1KeyEntry, R1KeyStore};
use crate::transport::{
    DisassocNotifier, InterApTransport, KeyInstallSink, RemoteRequest, RemoteRequestType,
};

/// Confirm frames carry sequence number 3 in their MIC.
const SEQ_CONFIRM: u8 = 3;

/// Ack frames carry sequence number 4 in their MIC.
const SEQ_ACK: u8 = 4;

/// Elements covered by the MIC when no resource request is present.
const MIC_ELEMENT_COUNT: u8 = 3;

/// Offset of the MIC field inside a serialized FTIE.
const FTIE_MIC_OFFSET: usize = 4;

/// What became of a station frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Reply frame to transmit back to the station.
    Reply(Vec<u8>),
    /// Frame was handed to the inter-AP transport.
    Forwarded,
}

/// Fast BSS transition engine for one BSS.
pub struct FtEngine<E: Environment> {
    config: FtConfig,
    env: E,
    store: Mutex<R1KeyStore>,
    sessions: Mutex<HashMap<MacAddr, HandshakeContext>>,
    transport: Arc<dyn InterApTransport>,
    installer: Arc<dyn KeyInstallSink>,
    notifier: Arc<dyn DisassocNotifier>,
}

impl<E: Environment> FtEngine<E> {
    /// Build an engine after validating the configuration.
    pub fn new(
        config: FtConfig,
        env: E,
        transport: Arc<dyn InterApTransport>,
        installer: Arc<dyn KeyInstallSink>,
        notifier: Arc<dyn DisassocNotifier>,
    ) -> Result<Self, FtError> {
        config.validate()?;
        let store = Mutex::new(R1KeyStore::new(config.store_capacity));
        Ok(Self {
            config,
            env,
            store,
            sessions: Mutex::new(HashMap::new()),
            transport,
            installer,
            notifier,
        })
    }

    /// Cache a PMK-R1 pushed down from the R0 key holder.
    ///
    /// The entry's lifetime is capped at the configured
    /// `key_lifetime_ticks`; a remote key holder cannot keep a key cached
    /// here longer than this BSS allows.
    pub fn install_pmk_r1(&self, mut entry: R1KeyEntry) -> Result<(), FtError> {
        entry.key_lifetime = entry.key_lifetime.min(self.config.key_lifetime_ticks);
        let mut store = self.lock_store();
        if store.insert(entry) {
            Ok(())
        } else {
            Err(FtError::CapacityExceeded { capacity: self.config.store_capacity })
        }
    }

    /// Derive and cache the key hierarchy for a station finishing its
    /// initial association on this BSS.
    ///
    /// Acting as a co-located R0 key holder: PMK-R0 comes from the root
    /// key of the association and the configured SSID, mobility domain,
    /// and R0KH-ID; the local PMK-R1 is cached with the configured
    /// lifetime and the PMK-R0 is dropped. Returns the PMK-R0 and PMK-R1
    /// names so the caller can advertise them to the station.
    pub fn establish_initial_keys(
        &self,
        root_key: &[u8],
        sta_mac: MacAddr,
        pairwise_cipher: SuiteSelector,
    ) -> Result<([u8; 16], [u8; 16]), FtError> {
        let (pmk_r0, pmk_r0_name) = derive_pmk_r0(
            root_key,
            &self.config.ssid,
            self.config.md_id.0,
            &self.config.r0kh_id,
            *sta_mac.as_bytes(),
        )?;
        let (pmk_r1, pmk_r1_name) =
            derive_pmk_r1(&pmk_r0, &pmk_r0_name, self.config.r1kh_id(), sta_mac.as_bytes());
        self.install_pmk_r1(R1KeyEntry {
            pmk_r1,
            pmk_r1_name,
            pmk_r0_name,
            r0kh_id: self.config.r0kh_id.clone(),
            akm: self.config.akm,
            pairwise_cipher,
            sta_mac,
            key_lifetime: self.config.key_lifetime_ticks,
            reassoc_deadline: self.config.reassoc_deadline_ticks,
        })?;
        debug!(sta = %sta_mac, "initial key hierarchy established");
        Ok((pmk_r0_name, pmk_r1_name))
    }

    /// Drop a cached PMK-R1. Idempotent.
    pub fn revoke_pmk_r1(&self, pmk_r1_name: &[u8; 16]) -> bool {
        self.lock_store().remove(pmk_r1_name)
    }

    /// Number of cached R1 keys.
    pub fn cached_keys(&self) -> usize {
        self.lock_store().len()
    }

    /// Handle an FT action frame received over the air from a station.
    ///
    /// Frames targeting this BSSID are processed locally and answered;
    /// frames targeting another AP are forwarded over the inter-AP
    /// transport without inspecting their elements.
    pub fn handle_station_frame(&self, bytes: &[u8]) -> Result<Disposition, FtError> {
        if !self.config.enabled {
            return Err(FtError::NotEnabled);
        }
        let frame = FtActionFrame::parse(bytes)?;
        match frame.action {
            FtAction::Request | FtAction::Confirm => {},
            FtAction::Response | FtAction::Ack => {
                return Err(FtError::UnexpectedFrame("Response/Ack from a station"));
            },
        }

        if frame.target_ap != self.config.bssid {
            debug!(sta = %frame.sta_mac, target = %frame.target_ap, "forwarding to target AP");
            self.transport
                .send(RemoteRequest {
                    request_type: RemoteRequestType::Request,
                    sta_mac: frame.sta_mac,
                    target_ap: frame.target_ap,
                    payload: bytes.to_vec(),
                })
                .map_err(FtError::Transport)?;
            return Ok(Disposition::Forwarded);
        }

        Ok(Disposition::Reply(self.local_reply(&frame)?))
    }

    /// Handle a frame arriving over the inter-AP transport.
    ///
    /// Station-to-target traffic is processed as if received locally and the
    /// reply is sent back through the transport; target-to-station traffic
    /// is returned for over-the-air delivery, payload untouched.
    pub fn handle_remote_frame(&self, request: RemoteRequest) -> Result<Option<Vec<u8>>, FtError> {
        if !self.config.enabled {
            return Err(FtError::NotEnabled);
        }
        match request.request_type {
            RemoteRequestType::Request => {
                let frame = FtActionFrame::parse(&request.payload)?;
                if frame.target_ap != self.config.bssid {
                    return Err(FtError::UnexpectedFrame("relayed frame for another AP"));
                }
                match frame.action {
                    FtAction::Request | FtAction::Confirm => {},
                    FtAction::Response | FtAction::Ack => {
                        return Err(FtError::UnexpectedFrame("relayed Response/Ack as a request"));
                    },
                }
                let reply = self.local_reply(&frame)?;
                self.transport
                    .send(RemoteRequest {
                        request_type: RemoteRequestType::Response,
                        sta_mac: request.sta_mac,
                        target_ap: request.target_ap,
                        payload: reply,
                    })
                    .map_err(FtError::Transport)?;
                Ok(None)
            },
            RemoteRequestType::Response => Ok(Some(request.payload)),
        }
    }

    /// One maintenance tick: age cached keys and pending handshakes.
    ///
    /// Each expired key fires the disassociation notifier exactly once,
    /// after the store lock is released.
    pub fn tick(&self) {
        let mut expired = Vec::new();
        {
            let mut store = self.lock_store();
            store.sweep(|mac| expired.push(mac));
        }
        for mac in &expired {
            warn!(sta = %mac, "R1 key lifetime lapsed, disassociating");
            self.notifier.notify(*mac);
        }

        let mut sessions = self.lock_sessions();
        sessions.retain(|mac, ctx| {
            let lapsed = ctx.tick();
            if lapsed {
                debug!(sta = %mac, "pending handshake expired");
            }
            !lapsed
        });
    }

    fn local_reply(&self, frame: &FtActionFrame) -> Result<Vec<u8>, FtError> {
        match frame.action {
            FtAction::Request => self.build_response(frame),
            FtAction::Confirm => self.build_ack(frame),
            FtAction::Response | FtAction::Ack => {
                Err(FtError::UnexpectedFrame("Response/Ack cannot be processed locally"))
            },
        }
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, R1KeyStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<MacAddr, HandshakeContext>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Request path ----

    fn build_response(&self, frame: &FtActionFrame) -> Result<Vec<u8>, FtError> {
        let (status, elements) = match self.validate_request(frame) {
            Ok(elements) => (StatusCode::Success, elements),
            Err(err) => {
                warn!(sta = %frame.sta_mac, %err, "rejecting FT request");
                (err.status_code(), self.rejection_elements())
            },
        };
        let reply = FtActionFrame {
            action: FtAction::Response,
            sta_mac: frame.sta_mac,
            target_ap: frame.target_ap,
            status: Some(status),
            elements,
        };
        Ok(reply.to_bytes())
    }

    fn validate_request(&self, frame: &FtActionFrame) -> Result<FtElements, ValidationError> {
        let sta_mdie = self.check_mdie(frame)?;

        if frame.elements.is_open() {
            // Open-security transition: no key hierarchy, just the domain
            // agreement and the capability intersection.
            debug!(sta = %frame.sta_mac, "open FT request accepted");
            let mut elements = FtElements::default();
            elements.set_mdie(&MdIe::new(
                self.config.md_id,
                self.config.mdie_capabilities() & sta_mdie.ft_capabilities,
            ));
            return Ok(elements);
        }

        let rsne = frame
            .elements
            .rsne()
            .map_err(|_| ValidationError::InvalidAkmp)?
            .ok_or(ValidationError::InvalidAkmp)?;

        let [akm] = rsne.akm_suites[..] else {
            return Err(ValidationError::InvalidAkmp);
        };
        if akm != self.config.akm {
            return Err(ValidationError::InvalidAkmp);
        }

        let [pairwise] = rsne.pairwise_ciphers[..] else {
            return Err(ValidationError::InvalidPairwiseCipher);
        };
        if !self.config.pairwise_ciphers.contains(&pairwise) {
            return Err(ValidationError::InvalidPairwiseCipher);
        }

        let [claimed_r0_name] = rsne.pmkids[..] else {
            return Err(ValidationError::InvalidPmkid);
        };

        let ftie = frame
            .elements
            .ftie()
            .map_err(|_| ValidationError::InvalidFtie)?
            .ok_or(ValidationError::InvalidFtie)?;
        let r0kh_id = ftie.r0kh_id.as_ref().ok_or(ValidationError::InvalidFtie)?;
        if *r0kh_id != self.config.r0kh_id {
            return Err(ValidationError::InvalidFtie);
        }

        let pmk_r1_name = derive_pmk_r1_name(
            &claimed_r0_name,
            self.config.r1kh_id(),
            frame.sta_mac.as_bytes(),
        );

        // Copy what the derivation needs, then release the store lock
        let (pmk_r1, entry_r0_name, entry_akm, entry_cipher) = {
            let store = self.lock_store();
            let entry = store.lookup(&pmk_r1_name).ok_or(ValidationError::R0khUnreachable)?;
            (entry.pmk_r1.clone(), entry.pmk_r0_name, entry.akm, entry.pairwise_cipher)
        };

        if entry_r0_name != claimed_r0_name {
            return Err(ValidationError::InvalidPmkid);
        }
        if entry_akm != akm {
            return Err(ValidationError::InvalidAkmp);
        }
        if entry_cipher != pairwise {
            return Err(ValidationError::InvalidPairwiseCipher);
        }

        let anonce = self.env.random_nonce();
        let ptk_len = if pairwise == CIPHER_TKIP { PTK_TKIP_LEN } else { PTK_CCMP_LEN };
        let Ok((ptk, ptk_name)) = derive_ptk(
            &pmk_r1,
            &pmk_r1_name,
            &anonce,
            &ftie.snonce,
            self.config.bssid.as_bytes(),
            frame.sta_mac.as_bytes(),
            ptk_len,
        ) else {
            unreachable!("PTK length is one of the two supported values");
        };

        debug!(sta = %frame.sta_mac, "FT request validated, awaiting confirm");
        self.lock_sessions().insert(
            frame.sta_mac,
            HandshakeContext {
                state: HandshakeState::AwaitingConfirm,
                sta_mac: frame.sta_mac,
                pmk_r1_name,
                anonce,
                snonce: ftie.snonce,
                ptk,
                ptk_name,
                pairwise_cipher: pairwise,
                deadline: self.config.reassoc_deadline_ticks,
            },
        );

        let mut elements = FtElements::default();
        elements.set_mdie(&MdIe::new(
            self.config.md_id,
            self.config.mdie_capabilities() & sta_mdie.ft_capabilities,
        ));
        let reply_rsne = Rsne {
            group_cipher: Some(self.config.group_cipher),
            pairwise_ciphers: vec![pairwise],
            akm_suites: vec![akm],
            capabilities: Some(0),
            ..Rsne::default()
        }
        .with_pmkid(claimed_r0_name);
        elements.set_rsne(&reply_rsne).map_err(|_| ValidationError::InvalidFtie)?;
        let reply_ftie = FtIe {
            element_count: 0,
            anonce,
            snonce: ftie.snonce,
            r0kh_id: Some(self.config.r0kh_id.clone()),
            r1kh_id: Some(*self.config.r1kh_id()),
            ..FtIe::default()
        };
        elements.set_ftie(&reply_ftie).map_err(|_| ValidationError::InvalidFtie)?;
        Ok(elements)
    }

    // ---- Confirm path ----

    fn build_ack(&self, frame: &FtActionFrame) -> Result<Vec<u8>, FtError> {
        let outcome = self.validate_confirm(frame);
        let (status, elements) = match outcome {
            Ok(ctx) => {
                let elements = self.ack_elements(frame, &ctx)?;
                self.installer.install_ptk(ctx.sta_mac, &ctx.ptk, ctx.pairwise_cipher);
                self.lock_store()
                    .refresh_reassoc_deadline(&ctx.pmk_r1_name, self.config.reassoc_deadline_ticks);
                debug!(sta = %frame.sta_mac, "FT handshake complete, PTK installed");
                (StatusCode::Success, elements)
            },
            Err(err) => {
                warn!(sta = %frame.sta_mac, %err, "rejecting FT confirm");
                (err.status_code(), self.rejection_elements())
            },
        };
        let reply = FtActionFrame {
            action: FtAction::Ack,
            sta_mac: frame.sta_mac,
            target_ap: frame.target_ap,
            status: Some(status),
            elements,
        };
        Ok(reply.to_bytes())
    }

    /// Run the confirm validation chain. The context is taken out of the
    /// session table up front: success completes it, failure terminates it,
    /// and either way a retransmission starts from scratch.
    fn validate_confirm(
        &self,
        frame: &FtActionFrame,
    ) -> Result<HandshakeContext, ValidationError> {
        let ctx = self
            .lock_sessions()
            .remove(&frame.sta_mac)
            .ok_or(ValidationError::NoPendingHandshake)?;
        if !ctx.state.accepts_confirm() {
            return Err(ValidationError::NoPendingHandshake);
        }

        self.check_mdie(frame)?;

        let rsne = frame
            .elements
            .rsne()
            .map_err(|_| ValidationError::InvalidAkmp)?
            .ok_or(ValidationError::InvalidAkmp)?;
        let [akm] = rsne.akm_suites[..] else {
            return Err(ValidationError::InvalidAkmp);
        };
        if akm != self.config.akm {
            return Err(ValidationError::InvalidAkmp);
        }

        let [pmkid] = rsne.pmkids[..] else {
            return Err(ValidationError::InvalidPmkid);
        };
        if pmkid != ctx.pmk_r1_name {
            return Err(ValidationError::InvalidPmkid);
        }

        let ftie = frame
            .elements
            .ftie()
            .map_err(|_| ValidationError::InvalidFtie)?
            .ok_or(ValidationError::InvalidFtie)?;
        if ftie.anonce != ctx.anonce || ftie.snonce != ctx.snonce {
            return Err(ValidationError::InvalidFtie);
        }
        if ftie.r0kh_id.as_deref() != Some(self.config.r0kh_id.as_slice()) {
            return Err(ValidationError::InvalidFtie);
        }
        if ftie.r1kh_id.as_ref() != Some(self.config.r1kh_id()) {
            return Err(ValidationError::InvalidFtie);
        }

        let ric = frame.elements.ric_bytes();
        let expected_count = MIC_ELEMENT_COUNT + u8::from(!ric.is_empty());
        if ftie.element_count != expected_count {
            return Err(ValidationError::InvalidFtie);
        }

        // MIC last: every semantic mismatch above reports its own status
        let zeroed_ftie = mic_zeroed(frame.elements.ftie_bytes())
            .map_err(|_| ValidationError::InvalidFtie)?;
        let expected_mic = compute_mic(
            ctx.ptk.kck(),
            &MicInput {
                sta_mac: *frame.sta_mac.as_bytes(),
                ap_mac: *self.config.bssid.as_bytes(),
                seq: SEQ_CONFIRM,
                rsne: frame.elements.rsne_bytes(),
                mdie: frame.elements.mdie_bytes(),
                ftie: &zeroed_ftie,
                ric,
            },
        );
        if !verify_mic(&expected_mic, &ftie.mic) {
            return Err(ValidationError::MicMismatch);
        }

        Ok(ctx)
    }

    fn ack_elements(
        &self,
        frame: &FtActionFrame,
        ctx: &HandshakeContext,
    ) -> Result<FtElements, FtError> {
        let mut elements = FtElements::default();
        elements.set_mdie(&MdIe::new(self.config.md_id, self.config.mdie_capabilities()));

        let rsne = Rsne {
            group_cipher: Some(self.config.group_cipher),
            pairwise_ciphers: vec![ctx.pairwise_cipher],
            akm_suites: vec![self.config.akm],
            capabilities: Some(0),
            ..Rsne::default()
        }
        .with_pmkid(ctx.pmk_r1_name);
        elements.set_rsne(&rsne)?;

        let padded = pad_group_key(&self.config.group_key);
        let wrapped = wrap_key(ctx.ptk.kek(), &padded)?;
        let gtk = GtkSubElement::new(
            self.config.group_key_id,
            self.config.group_key.len() as u8,
            self.config.group_rsc,
            wrapped,
        );

        let ftie = FtIe {
            element_count: MIC_ELEMENT_COUNT,
            anonce: ctx.anonce,
            snonce: ctx.snonce,
            r0kh_id: Some(self.config.r0kh_id.clone()),
            r1kh_id: Some(*self.config.r1kh_id()),
            gtk: Some(gtk),
            ..FtIe::default()
        };
        let mut ftie_bytes = Vec::new();
        ftie.write_into(&mut ftie_bytes)?;

        let mic = compute_mic(
            ctx.ptk.kck(),
            &MicInput {
                sta_mac: *frame.sta_mac.as_bytes(),
                ap_mac: *self.config.bssid.as_bytes(),
                seq: SEQ_ACK,
                rsne: elements.rsne_bytes(),
                mdie: elements.mdie_bytes(),
                ftie: &ftie_bytes,
                ric: &[],
            },
        );
        ftie_bytes[FTIE_MIC_OFFSET..FTIE_MIC_OFFSET + 16].copy_from_slice(&mic);
        elements.set_ftie_bytes(ftie_bytes);
        Ok(elements)
    }

    // ---- Shared checks ----

    fn check_mdie(&self, frame: &FtActionFrame) -> Result<MdIe, ValidationError> {
        let mdie = frame
            .elements
            .mdie()
            .map_err(|_| ValidationError::InvalidMdie)?
            .ok_or(ValidationError::InvalidMdie)?;
        if mdie.md_id != self.config.md_id {
            return Err(ValidationError::InvalidMdie);
        }
        Ok(mdie)
    }

    /// Elements attached to a rejection: the domain advertisement only.
    fn rejection_elements(&self) -> FtElements {
        let mut elements = FtElements::default();
        elements.set_mdie(&MdIe::new(self.config.md_id, self.config.mdie_capabilities()));
        elements
    }
}
