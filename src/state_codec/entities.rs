//! Per-entity encode/decode procedures (spec §4.6 "Specific shapes worth
//! spelling out").

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::state::{
    Beta, BlockInfo, Chi, Config, CoreActivity, CoreAssignment, Delta, Eta, Gamma, Hash, Phi, Pi,
    PreimageEntry, Psi, Rho, SealKeys, ServiceAccount, ServiceActivity, Tau, TicketBody, Theta,
    Validator, ValidatorActivity, ValidatorSet, WorkReport, Xi,
};

use super::{DecodingContext, Reader, StateCodecError, Writer};

/// **Eta (η):** four fixed 32-byte hashes, concatenated.
pub fn decode_eta(reader: &mut Reader, ctx: &mut DecodingContext) -> Result<Eta, StateCodecError> {
    ctx.component("Eta", |ctx| {
        let mut entries = [[0u8; 32]; 4];
        for (i, slot) in entries.iter_mut().enumerate() {
            *slot = ctx.index(i, |ctx| reader.read_hash(ctx))?;
        }
        Ok(Eta(entries))
    })
}

pub fn encode_eta(writer: &mut Writer, eta: &Eta) {
    for hash in &eta.0 {
        writer.write_hash(hash);
    }
}

/// **Tau (τ):** fixed-width LE `u32` timeslot.
pub fn decode_tau(reader: &mut Reader, ctx: &mut DecodingContext) -> Result<Tau, StateCodecError> {
    ctx.component("Tau", |ctx| Ok(Tau(reader.read_u32(ctx)?)))
}

pub fn encode_tau(writer: &mut Writer, tau: &Tau) {
    writer.write_u32(tau.0);
}

fn decode_validator(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<Validator, StateCodecError> {
    Ok(Validator {
        bandersnatch: reader.read_fixed::<32>(ctx)?,
        ed25519: reader.read_fixed::<32>(ctx)?,
        bls: reader.read_fixed::<144>(ctx)?,
        metadata: reader.read_fixed::<128>(ctx)?,
    })
}

fn encode_validator(writer: &mut Writer, validator: &Validator) {
    writer.write_bytes(&validator.bandersnatch);
    writer.write_bytes(&validator.ed25519);
    writer.write_bytes(&validator.bls);
    writer.write_bytes(&validator.metadata);
}

/// **Validator set:** raw concatenation of fixed-width records.
pub fn decode_validator_set(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    count: u32,
) -> Result<ValidatorSet, StateCodecError> {
    ctx.component("ValidatorSet", |ctx| {
        let mut validators = Vec::with_capacity(count as usize);
        for i in 0..count {
            validators.push(ctx.index(i as usize, |ctx| decode_validator(reader, ctx))?);
        }
        Ok(ValidatorSet(validators))
    })
}

pub fn encode_validator_set(writer: &mut Writer, set: &ValidatorSet) {
    for validator in &set.0 {
        encode_validator(writer, validator);
    }
}

fn decode_ticket_body(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<TicketBody, StateCodecError> {
    let id = reader.read_hash(ctx)?;
    let attempt = reader.read_u8(ctx)?;
    Ok(TicketBody { id, attempt })
}

fn encode_ticket_body(writer: &mut Writer, ticket: &TicketBody) {
    writer.write_hash(&ticket.id);
    writer.write_u8(ticket.attempt);
}

/// **Gamma:** `validators ∥ vrf_root ∥ E_nat(tag) ∥ (tickets | keys) ∥
/// E_nat(|a|) ∥ a`.
pub fn decode_gamma(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    config: &Config,
) -> Result<Gamma, StateCodecError> {
    ctx.component("Gamma", |ctx| {
        let validators =
            ctx.field("validators", |ctx| decode_validator_set(reader, ctx, config.validator_count))?;
        let vrf_root = ctx.field("vrf_root", |ctx| reader.read_fixed::<144>(ctx))?;
        let tag = ctx.field("tag", |ctx| reader.read_nat(ctx))?;
        let seal = ctx.field("seal", |ctx| match tag {
            0 => {
                let mut tickets = Vec::with_capacity(config.epoch_length as usize);
                for i in 0..config.epoch_length {
                    tickets.push(ctx.index(i as usize, |ctx| decode_ticket_body(reader, ctx))?);
                }
                Ok(SealKeys::Tickets(tickets))
            }
            1 => {
                let mut keys = Vec::with_capacity(config.epoch_length as usize);
                for i in 0..config.epoch_length {
                    keys.push(ctx.index(i as usize, |ctx| reader.read_fixed::<32>(ctx))?);
                }
                Ok(SealKeys::Keys(keys))
            }
            other => Err(ctx.invalid_state_type(other)),
        })?;
        let acc_len = ctx.field("accumulator_len", |ctx| reader.read_nat(ctx))?;
        let accumulator = ctx.field("accumulator", |ctx| {
            let mut out = Vec::with_capacity(acc_len as usize);
            for i in 0..acc_len {
                out.push(ctx.index(i as usize, |ctx| decode_ticket_body(reader, ctx))?);
            }
            Ok(out)
        })?;
        Ok(Gamma {
            validators,
            vrf_root,
            seal,
            accumulator,
        })
    })
}

pub fn encode_gamma(writer: &mut Writer, gamma: &Gamma) {
    encode_validator_set(writer, &gamma.validators);
    writer.write_bytes(&gamma.vrf_root);
    match &gamma.seal {
        SealKeys::Tickets(tickets) => {
            writer.write_nat(0);
            for ticket in tickets {
                encode_ticket_body(writer, ticket);
            }
        }
        SealKeys::Keys(keys) => {
            writer.write_nat(1);
            for key in keys {
                writer.write_bytes(key);
            }
        }
    }
    writer.write_nat(gamma.accumulator.len() as u64);
    for ticket in &gamma.accumulator {
        encode_ticket_body(writer, ticket);
    }
}

/// **Phi:** `Q` hash slots per core; all-zero slots are skipped on decode.
pub fn decode_phi(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    config: &Config,
) -> Result<Phi, StateCodecError> {
    ctx.component("Phi", |ctx| {
        let mut cores = Vec::with_capacity(config.core_count as usize);
        for c in 0..config.core_count {
            let queue = ctx.index(c as usize, |ctx| {
                let mut entries = Vec::new();
                for _ in 0..config.q {
                    let hash = reader.read_hash(ctx)?;
                    if hash != [0u8; 32] {
                        entries.push(hash);
                    }
                }
                Ok(entries)
            })?;
            cores.push(queue);
        }
        Ok(Phi(cores))
    })
}

pub fn encode_phi(writer: &mut Writer, phi: &Phi, config: &Config) {
    for queue in &phi.0 {
        for hash in queue {
            writer.write_hash(hash);
        }
        for _ in queue.len()..config.q as usize {
            writer.write_hash(&[0u8; 32]);
        }
    }
}

fn decode_work_report(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<WorkReport, StateCodecError> {
    let hash = reader.read_hash(ctx)?;
    let exports_root = reader.read_hash(ctx)?;
    Ok(WorkReport { hash, exports_root })
}

fn encode_work_report(writer: &mut Writer, report: &WorkReport) {
    writer.write_hash(&report.hash);
    writer.write_hash(&report.exports_root);
}

/// **Rho:** per-core existence marker then `{hash, work_report, timeslot}`.
pub fn decode_rho(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    config: &Config,
) -> Result<Rho, StateCodecError> {
    ctx.component("Rho", |ctx| {
        let mut cores = Vec::with_capacity(config.core_count as usize);
        for c in 0..config.core_count {
            let entry = ctx.index(c as usize, |ctx| {
                if !reader.read_existence_marker(ctx)? {
                    return Ok(None);
                }
                let hash = reader.read_hash(ctx)?;
                let work_report = decode_work_report(reader, ctx)?;
                let timeslot = reader.read_u32(ctx)?;
                Ok(Some(CoreAssignment {
                    hash,
                    work_report,
                    timeslot,
                }))
            })?;
            cores.push(entry);
        }
        Ok(Rho(cores))
    })
}

pub fn encode_rho(writer: &mut Writer, rho: &Rho) {
    for entry in &rho.0 {
        match entry {
            None => writer.write_existence_marker(false),
            Some(assignment) => {
                writer.write_existence_marker(true);
                writer.write_hash(&assignment.hash);
                encode_work_report(writer, &assignment.work_report);
                writer.write_u32(assignment.timeslot);
            }
        }
    }
}

fn decode_hash_set(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<Vec<Hash>, StateCodecError> {
    let len = reader.read_nat(ctx)?;
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        out.push(ctx.index(i as usize, |ctx| reader.read_hash(ctx))?);
    }
    if out.iter().tuple_windows().any(|(a, b)| a >= b) {
        return Err(ctx.invalid_format());
    }
    Ok(out)
}

fn encode_hash_set(writer: &mut Writer, set: &[Hash]) {
    writer.write_nat(set.len() as u64);
    for hash in set {
        writer.write_hash(hash);
    }
}

/// **Psi:** four consecutive length-prefixed hash sets, `good, bad, wonky,
/// punish`.
pub fn decode_psi(reader: &mut Reader, ctx: &mut DecodingContext) -> Result<Psi, StateCodecError> {
    ctx.component("Psi", |ctx| {
        let good = ctx.field("good", |ctx| decode_hash_set(reader, ctx))?;
        let bad = ctx.field("bad", |ctx| decode_hash_set(reader, ctx))?;
        let wonky = ctx.field("wonky", |ctx| decode_hash_set(reader, ctx))?;
        let punish = ctx.field("punish", |ctx| decode_hash_set(reader, ctx))?;
        Ok(Psi {
            good,
            bad,
            wonky,
            punish,
        })
    })
}

pub fn encode_psi(writer: &mut Writer, psi: &Psi) {
    encode_hash_set(writer, &psi.good);
    encode_hash_set(writer, &psi.bad);
    encode_hash_set(writer, &psi.wonky);
    encode_hash_set(writer, &psi.punish);
}

/// **Xi:** per-slot `u8` count then that many hashes, plus a union index.
pub fn decode_xi(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    config: &Config,
) -> Result<Xi, StateCodecError> {
    ctx.component("Xi", |ctx| {
        let mut slots = Vec::with_capacity(config.epoch_length as usize);
        let mut union = BTreeSet::new();
        for s in 0..config.epoch_length {
            let slot = ctx.index(s as usize, |ctx| {
                let count = reader.read_u8(ctx)?;
                let mut hashes = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    hashes.push(reader.read_hash(ctx)?);
                }
                Ok(hashes)
            })?;
            union.extend(slot.iter().copied());
            slots.push(slot);
        }
        Ok(Xi { slots, union })
    })
}

pub fn encode_xi(writer: &mut Writer, xi: &Xi) -> Result<(), StateCodecError> {
    for slot in &xi.slots {
        if slot.len() > u8::MAX as usize {
            return Err(DecodingContext::new().out_of_memory());
        }
        writer.write_u8(slot.len() as u8);
        for hash in slot {
            writer.write_hash(hash);
        }
    }
    Ok(())
}

fn decode_block_info(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<BlockInfo, StateCodecError> {
    let header_hash = reader.read_hash(ctx)?;
    let beefy_root = reader.read_hash(ctx)?;
    let state_root = reader.read_hash(ctx)?;
    let report_len = reader.read_nat(ctx)?;
    let mut work_reports = Vec::with_capacity(report_len as usize);
    for i in 0..report_len {
        work_reports.push(ctx.index(i as usize, |ctx| decode_work_report(reader, ctx))?);
    }
    Ok(BlockInfo {
        header_hash,
        beefy_root,
        state_root,
        work_reports,
    })
}

/// **Beta (canonical):** `E_nat(|blocks|)` then per block `header_hash ∥
/// beefy_root ∥ state_root ∥ E_nat(|reports|) ∥ reports`. This is the only
/// path the encoder produces (spec §9 Open Question: Beta wire format).
pub fn decode_beta(reader: &mut Reader, ctx: &mut DecodingContext) -> Result<Beta, StateCodecError> {
    ctx.component("Beta", |ctx| {
        let len = reader.read_nat(ctx)?;
        let mut blocks = Vec::with_capacity(len as usize);
        for i in 0..len {
            blocks.push(ctx.index(i as usize, |ctx| decode_block_info(reader, ctx))?);
        }
        Ok(Beta(blocks))
    })
}

pub fn encode_beta(writer: &mut Writer, beta: &Beta) {
    writer.write_nat(beta.0.len() as u64);
    for block in &beta.0 {
        writer.write_hash(&block.header_hash);
        writer.write_hash(&block.beefy_root);
        writer.write_hash(&block.state_root);
        writer.write_nat(block.work_reports.len() as u64);
        for report in &block.work_reports {
            encode_work_report(writer, report);
        }
    }
}

/// **Beta (legacy):** `E_nat(|peaks|)` then per peak a 1-byte existence flag
/// and a 32-byte hash when present. Decode-only: historical blobs in this
/// shape can still be read, but the encoder never produces it.
pub fn decode_beta_legacy_peaks(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<Vec<Option<Hash>>, StateCodecError> {
    ctx.component("BetaLegacyPeaks", |ctx| {
        let len = reader.read_nat(ctx)?;
        let mut peaks = Vec::with_capacity(len as usize);
        for i in 0..len {
            let peak = ctx.index(i as usize, |ctx| {
                if reader.read_existence_marker(ctx)? {
                    Ok(Some(reader.read_hash(ctx)?))
                } else {
                    Ok(None)
                }
            })?;
            peaks.push(peak);
        }
        Ok(peaks)
    })
}

/// **Chi:** `u32 manager ∥ core_count × u32 assign ∥ u32 designate ∥
/// E_nat(|m|) ∥ m·(u32 key, u64 value)`; index 0 decodes as `None`.
pub fn decode_chi(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    config: &Config,
) -> Result<Chi, StateCodecError> {
    ctx.component("Chi", |ctx| {
        let manager = ctx.field("manager", |ctx| {
            let raw = reader.read_u32(ctx)?;
            Ok(if raw == 0 { None } else { Some(raw) })
        })?;
        let assign = ctx.field("assign", |ctx| {
            let mut v = Vec::with_capacity(config.core_count as usize);
            for i in 0..config.core_count {
                v.push(ctx.index(i as usize, |ctx| reader.read_u32(ctx))?);
            }
            Ok(v)
        })?;
        let designate = ctx.field("designate", |ctx| {
            let raw = reader.read_u32(ctx)?;
            Ok(if raw == 0 { None } else { Some(raw) })
        })?;
        let m_len = ctx.field("always_accumulate_len", |ctx| reader.read_nat(ctx))?;
        let always_accumulate = ctx.field("always_accumulate", |ctx| {
            let mut entries = Vec::with_capacity(m_len as usize);
            for i in 0..m_len {
                entries.push(ctx.index(i as usize, |ctx| {
                    let key = reader.read_u32(ctx)?;
                    let value = reader.read_u64(ctx)?;
                    Ok((key, value))
                })?);
            }
            if entries.iter().tuple_windows().any(|(a, b)| a.0 >= b.0) {
                return Err(ctx.invalid_format());
            }
            Ok(entries.into_iter().collect::<BTreeMap<_, _>>())
        })?;
        Ok(Chi {
            manager,
            assign,
            designate,
            always_accumulate,
        })
    })
}

pub fn encode_chi(writer: &mut Writer, chi: &Chi) {
    writer.write_u32(chi.manager.unwrap_or(0));
    for core in &chi.assign {
        writer.write_u32(*core);
    }
    writer.write_u32(chi.designate.unwrap_or(0));
    writer.write_nat(chi.always_accumulate.len() as u64);
    for (key, value) in &chi.always_accumulate {
        writer.write_u32(*key);
        writer.write_u64(*value);
    }
}

fn decode_service_account(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<ServiceAccount, StateCodecError> {
    let code_hash = reader.read_hash(ctx)?;
    let balance = reader.read_u64(ctx)?;
    let min_item_gas = reader.read_u64(ctx)?;
    let min_memo_gas = reader.read_u64(ctx)?;
    let storage_footprint = reader.read_u64(ctx)?;
    let created_at = reader.read_u32(ctx)?;
    let last_accumulation = reader.read_u32(ctx)?;
    let parent_raw = reader.read_u32(ctx)?;
    let parent_service = if parent_raw == 0 { None } else { Some(parent_raw) };
    let preimage_len = reader.read_nat(ctx)?;
    let mut preimages = BTreeMap::new();
    for _ in 0..preimage_len {
        let key = reader.read_hash(ctx)?;
        let ts_count = reader.read_u8(ctx)?;
        if ts_count > 3 {
            return Err(ctx.invalid_value());
        }
        let mut timestamps = Vec::with_capacity(ts_count as usize);
        for _ in 0..ts_count {
            timestamps.push(reader.read_u32(ctx)?);
        }
        preimages.insert(key, PreimageEntry { timestamps });
    }
    Ok(ServiceAccount {
        code_hash,
        balance,
        min_item_gas,
        min_memo_gas,
        storage_footprint,
        created_at,
        last_accumulation,
        parent_service,
        preimages,
    })
}

fn encode_service_account(writer: &mut Writer, account: &ServiceAccount) {
    writer.write_hash(&account.code_hash);
    writer.write_u64(account.balance);
    writer.write_u64(account.min_item_gas);
    writer.write_u64(account.min_memo_gas);
    writer.write_u64(account.storage_footprint);
    writer.write_u32(account.created_at);
    writer.write_u32(account.last_accumulation);
    writer.write_u32(account.parent_service.unwrap_or(0));
    writer.write_nat(account.preimages.len() as u64);
    for (key, entry) in &account.preimages {
        writer.write_hash(key);
        writer.write_u8(entry.timestamps.len() as u8);
        for ts in &entry.timestamps {
            writer.write_u32(*ts);
        }
    }
}

/// **Delta:** `service_id -> ServiceAccount`, ascending keys (grounded on
/// the same length-prefixed ascending-map shape as [`Chi::always_accumulate`]
/// — spec §3 describes the field set but not its wire shape; this is the
/// Open Question decision recorded in DESIGN.md).
pub fn decode_delta(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<Delta, StateCodecError> {
    ctx.component("Delta", |ctx| {
        let len = reader.read_nat(ctx)?;
        let mut entries = Vec::with_capacity(len as usize);
        for i in 0..len {
            entries.push(ctx.index(i as usize, |ctx| {
                let id = reader.read_u32(ctx)?;
                let account = decode_service_account(reader, ctx)?;
                Ok((id, account))
            })?);
        }
        if entries.iter().tuple_windows().any(|(a, b)| a.0 >= b.0) {
            return Err(ctx.invalid_format());
        }
        Ok(Delta(entries.into_iter().collect::<BTreeMap<_, _>>()))
    })
}

pub fn encode_delta(writer: &mut Writer, delta: &Delta) {
    writer.write_nat(delta.0.len() as u64);
    for (id, account) in &delta.0 {
        writer.write_u32(*id);
        encode_service_account(writer, account);
    }
}

fn decode_validator_activity(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<ValidatorActivity, StateCodecError> {
    Ok(ValidatorActivity {
        blocks: reader.read_u32(ctx)?,
        tickets: reader.read_u32(ctx)?,
        pre_images: reader.read_u32(ctx)?,
        pre_images_size: reader.read_u32(ctx)?,
        guarantees: reader.read_u32(ctx)?,
        assurances: reader.read_u32(ctx)?,
    })
}

fn encode_validator_activity(writer: &mut Writer, activity: &ValidatorActivity) {
    writer.write_u32(activity.blocks);
    writer.write_u32(activity.tickets);
    writer.write_u32(activity.pre_images);
    writer.write_u32(activity.pre_images_size);
    writer.write_u32(activity.guarantees);
    writer.write_u32(activity.assurances);
}

fn decode_core_activity(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<CoreActivity, StateCodecError> {
    Ok(CoreActivity {
        da_load: reader.read_u32(ctx)?,
        popularity: reader.read_u32(ctx)?,
        imports: reader.read_u32(ctx)?,
        exports: reader.read_u32(ctx)?,
        extrinsic_size: reader.read_u32(ctx)?,
        extrinsic_count: reader.read_u32(ctx)?,
        bundle_size: reader.read_u32(ctx)?,
        gas_used: reader.read_u64(ctx)?,
    })
}

fn encode_core_activity(writer: &mut Writer, activity: &CoreActivity) {
    writer.write_u32(activity.da_load);
    writer.write_u32(activity.popularity);
    writer.write_u32(activity.imports);
    writer.write_u32(activity.exports);
    writer.write_u32(activity.extrinsic_size);
    writer.write_u32(activity.extrinsic_count);
    writer.write_u32(activity.bundle_size);
    writer.write_u64(activity.gas_used);
}

fn decode_service_activity(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<ServiceActivity, StateCodecError> {
    Ok(ServiceActivity {
        provided_count: reader.read_u32(ctx)?,
        provided_size: reader.read_u32(ctx)?,
        refinement_count: reader.read_u32(ctx)?,
        refinement_gas_used: reader.read_u64(ctx)?,
        imports: reader.read_u32(ctx)?,
        exports: reader.read_u32(ctx)?,
        extrinsic_size: reader.read_u32(ctx)?,
        extrinsic_count: reader.read_u32(ctx)?,
        accumulate_count: reader.read_u32(ctx)?,
        accumulate_gas_used: reader.read_u64(ctx)?,
        on_transfers_count: reader.read_u32(ctx)?,
        on_transfers_gas_used: reader.read_u64(ctx)?,
    })
}

fn encode_service_activity(writer: &mut Writer, activity: &ServiceActivity) {
    writer.write_u32(activity.provided_count);
    writer.write_u32(activity.provided_size);
    writer.write_u32(activity.refinement_count);
    writer.write_u64(activity.refinement_gas_used);
    writer.write_u32(activity.imports);
    writer.write_u32(activity.exports);
    writer.write_u32(activity.extrinsic_size);
    writer.write_u32(activity.extrinsic_count);
    writer.write_u32(activity.accumulate_count);
    writer.write_u64(activity.accumulate_gas_used);
    writer.write_u32(activity.on_transfers_count);
    writer.write_u64(activity.on_transfers_gas_used);
}

/// **Pi:** current/previous validator-stat arrays, per-core activity array,
/// then a length-prefixed ascending service-stat map.
pub fn decode_pi(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
    config: &Config,
) -> Result<Pi, StateCodecError> {
    ctx.component("Pi", |ctx| {
        let current_epoch = ctx.field("current_epoch", |ctx| {
            let mut v = Vec::with_capacity(config.validator_count as usize);
            for i in 0..config.validator_count {
                v.push(ctx.index(i as usize, |ctx| decode_validator_activity(reader, ctx))?);
            }
            Ok(v)
        })?;
        let previous_epoch = ctx.field("previous_epoch", |ctx| {
            let mut v = Vec::with_capacity(config.validator_count as usize);
            for i in 0..config.validator_count {
                v.push(ctx.index(i as usize, |ctx| decode_validator_activity(reader, ctx))?);
            }
            Ok(v)
        })?;
        let cores = ctx.field("cores", |ctx| {
            let mut v = Vec::with_capacity(config.core_count as usize);
            for i in 0..config.core_count {
                v.push(ctx.index(i as usize, |ctx| decode_core_activity(reader, ctx))?);
            }
            Ok(v)
        })?;
        let services_len = ctx.field("services_len", |ctx| reader.read_nat(ctx))?;
        let services = ctx.field("services", |ctx| {
            let mut entries = Vec::with_capacity(services_len as usize);
            for i in 0..services_len {
                entries.push(ctx.index(i as usize, |ctx| {
                    let id = reader.read_u32(ctx)?;
                    let activity = decode_service_activity(reader, ctx)?;
                    Ok((id, activity))
                })?);
            }
            if entries.iter().tuple_windows().any(|(a, b)| a.0 >= b.0) {
                return Err(ctx.invalid_format());
            }
            Ok(entries.into_iter().collect::<BTreeMap<_, _>>())
        })?;
        Ok(Pi {
            current_epoch,
            previous_epoch,
            cores,
            services,
        })
    })
}

pub fn encode_pi(writer: &mut Writer, pi: &Pi) {
    for activity in &pi.current_epoch {
        encode_validator_activity(writer, activity);
    }
    for activity in &pi.previous_epoch {
        encode_validator_activity(writer, activity);
    }
    for activity in &pi.cores {
        encode_core_activity(writer, activity);
    }
    writer.write_nat(pi.services.len() as u64);
    for (id, activity) in &pi.services {
        writer.write_u32(*id);
        encode_service_activity(writer, activity);
    }
}

/// **Theta:** length prefix then `(service_id, hash)` records.
pub fn decode_theta(
    reader: &mut Reader,
    ctx: &mut DecodingContext,
) -> Result<Theta, StateCodecError> {
    ctx.component("Theta", |ctx| {
        let len = reader.read_nat(ctx)?;
        let mut entries = Vec::with_capacity(len as usize);
        for i in 0..len {
            let entry = ctx.index(i as usize, |ctx| {
                let id = reader.read_u32(ctx)?;
                let hash = reader.read_hash(ctx)?;
                Ok((id, hash))
            })?;
            entries.push(entry);
        }
        Ok(Theta(entries))
    })
}

pub fn encode_theta(writer: &mut Writer, theta: &Theta) {
    writer.write_nat(theta.0.len() as u64);
    for (id, hash) in &theta.0 {
        writer.write_u32(*id);
        writer.write_hash(hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::StateCodecErrorKind;

    fn config() -> Config {
        Config::new(2, 4, 3, 2)
    }

    #[test]
    fn eta_round_trips() {
        let eta = Eta([[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]]);
        let mut writer = Writer::new();
        encode_eta(&mut writer, &eta);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let decoded = decode_eta(&mut reader, &mut ctx).unwrap();
        assert_eq!(decoded, eta);
    }

    #[test]
    fn eta_truncated_input_reports_end_of_stream() {
        let bytes = [0u8; 40];
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let err = decode_eta(&mut reader, &mut ctx).unwrap_err();
        assert_eq!(err.kind, StateCodecErrorKind::EndOfStream);
    }

    #[test]
    fn tau_round_trips() {
        let tau = Tau(123_456);
        let mut writer = Writer::new();
        encode_tau(&mut writer, &tau);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let decoded = decode_tau(&mut reader, &mut ctx).unwrap();
        assert_eq!(decoded, tau);
    }

    #[test]
    fn psi_round_trips() {
        let psi = Psi {
            good: vec![[1u8; 32], [2u8; 32]],
            bad: vec![[3u8; 32]],
            wonky: vec![],
            punish: vec![[4u8; 32]],
        };
        let mut writer = Writer::new();
        encode_psi(&mut writer, &psi);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let decoded = decode_psi(&mut reader, &mut ctx).unwrap();
        assert_eq!(decoded, psi);
    }

    #[test]
    fn psi_rejects_non_ascending_set() {
        let mut writer = Writer::new();
        writer.write_nat(2);
        writer.write_hash(&[2u8; 32]);
        writer.write_hash(&[1u8; 32]);
        writer.write_nat(0);
        writer.write_nat(0);
        writer.write_nat(0);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let err = decode_psi(&mut reader, &mut ctx).unwrap_err();
        assert_eq!(err.kind, StateCodecErrorKind::InvalidFormat);
    }

    #[test]
    fn validator_set_round_trips() {
        let set = ValidatorSet(vec![Validator::default(), Validator::default()]);
        let mut writer = Writer::new();
        encode_validator_set(&mut writer, &set);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let decoded = decode_validator_set(&mut reader, &mut ctx, 2).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn gamma_unknown_tag_is_invalid_state_type() {
        let config = config();
        let mut writer = Writer::new();
        encode_validator_set(&mut writer, &ValidatorSet(vec![Validator::default(); 3]));
        writer.write_bytes(&[0u8; 144]);
        writer.write_nat(7);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let err = decode_gamma(&mut reader, &mut ctx, &config).unwrap_err();
        assert_eq!(err.kind, StateCodecErrorKind::InvalidStateType(7));
    }

    #[test]
    fn rho_round_trips_with_absent_core() {
        let rho = Rho(vec![
            None,
            Some(CoreAssignment {
                hash: [9u8; 32],
                work_report: WorkReport {
                    hash: [1u8; 32],
                    exports_root: [2u8; 32],
                },
                timeslot: 42,
            }),
        ]);
        let mut writer = Writer::new();
        encode_rho(&mut writer, &rho);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let decoded = decode_rho(&mut reader, &mut ctx, &config()).unwrap();
        assert_eq!(decoded, rho);
    }

    #[test]
    fn chi_rejects_non_ascending_always_accumulate() {
        let mut writer = Writer::new();
        writer.write_u32(0);
        writer.write_u32(1);
        writer.write_u32(2);
        writer.write_u32(0);
        writer.write_nat(2);
        writer.write_u32(5);
        writer.write_u64(1);
        writer.write_u32(3);
        writer.write_u64(2);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let err = decode_chi(&mut reader, &mut ctx, &config()).unwrap_err();
        assert_eq!(err.kind, StateCodecErrorKind::InvalidFormat);
    }

    #[test]
    fn beta_round_trips() {
        let beta = Beta(vec![BlockInfo {
            header_hash: [1u8; 32],
            beefy_root: [2u8; 32],
            state_root: [3u8; 32],
            work_reports: vec![WorkReport {
                hash: [4u8; 32],
                exports_root: [5u8; 32],
            }],
        }]);
        let mut writer = Writer::new();
        encode_beta(&mut writer, &beta);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let mut ctx = DecodingContext::new();
        let decoded = decode_beta(&mut reader, &mut ctx).unwrap();
        assert_eq!(decoded, beta);
    }
}
