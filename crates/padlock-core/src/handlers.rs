//! Before- and after-action handlers for the device table.
//!
//! Before-actions drive the keypad and apply the outcome to the DUT; they run
//! against a scratch copy of the DUT, so an error leaves the model untouched.
//! After-actions only confirm what the device shows in its new state.

use crate::{
    action::{Action, ActionContext, ActionError},
    dut::{CounterKind, CredentialClass, Feature, PendingEnrollment},
    hardware::{Key, LedPattern, PowerState},
    pin::Pin,
    state::DeviceState,
    trigger::Trigger,
};

/// Keyed to acknowledge the last-try prompt.
const LAST_TRY_PHRASE: [Key; 8] =
    [Key::Key5, Key::Key2, Key::Key7, Key::Key8, Key::Key8, Key::Key7, Key::Key9, Key::Unlock];

pub(crate) const POWER_UP: Action = Action::new("power_up", power_up);
pub(crate) const POWER_DOWN: Action = Action::new("power_down", power_down);
pub(crate) const POST_RESULT: Action = Action::new("post_result", post_result);
pub(crate) const CONFIRM_ARRIVAL: Action = Action::new("confirm_arrival", confirm_arrival);

pub(crate) const PRESS_LOCK: Action = Action::new("press_lock", press_lock);
pub(crate) const USER_RESET: Action = Action::new("user_reset", user_reset);
pub(crate) const ADMIN_LOGIN: Action = Action::new("admin_login", admin_login);
pub(crate) const ENTER_ADMIN_PIN: Action = Action::new("enter_admin_pin", enter_admin_pin);
pub(crate) const ENTER_USER_PIN: Action = Action::new("enter_user_pin", enter_user_pin);
pub(crate) const ENTER_SELF_DESTRUCT_PIN: Action =
    Action::new("enter_self_destruct_pin", enter_self_destruct_pin);

pub(crate) const ENTER_WRONG_PIN: Action = Action::new("enter_wrong_pin", enter_wrong_pin);
pub(crate) const FAIL_LAST_TRY_LOCKED: Action =
    Action::new("fail_last_try_locked", fail_last_try_locked);
pub(crate) const FAIL_LAST_TRY_RESET: Action =
    Action::new("fail_last_try_reset", fail_last_try_reset);
pub(crate) const ENTER_LAST_TRY: Action = Action::new("enter_last_try", enter_last_try);
pub(crate) const RECOVERY_LOGIN: Action = Action::new("recovery_login", recovery_login);
pub(crate) const FAIL_RECOVERY: Action = Action::new("fail_recovery", fail_recovery);
pub(crate) const FAIL_RECOVERY_AND_BRICK: Action =
    Action::new("fail_recovery_and_brick", fail_recovery_and_brick);

pub(crate) const BEGIN_ADMIN_ENROLLMENT: Action =
    Action::new("begin_admin_enrollment", begin_admin_enrollment);
pub(crate) const BEGIN_USER_ENROLLMENT: Action =
    Action::new("begin_user_enrollment", begin_user_enrollment);
pub(crate) const BEGIN_RECOVERY_ENROLLMENT: Action =
    Action::new("begin_recovery_enrollment", begin_recovery_enrollment);
pub(crate) const BEGIN_SELF_DESTRUCT_ENROLLMENT: Action =
    Action::new("begin_self_destruct_enrollment", begin_self_destruct_enrollment);
pub(crate) const STORE_ENROLLED_PIN: Action =
    Action::new("store_enrolled_pin", store_enrolled_pin);
pub(crate) const REJECT_ENROLLED_PIN: Action =
    Action::new("reject_enrolled_pin", reject_enrolled_pin);
pub(crate) const PIN_ENROLLMENT_TIMED_OUT: Action =
    Action::new("pin_enrollment_timed_out", pin_enrollment_timed_out);
pub(crate) const CANCEL_PIN_ENROLLMENT: Action =
    Action::new("cancel_pin_enrollment", cancel_pin_enrollment);
pub(crate) const FORCED_USER_ENROLLMENT: Action =
    Action::new("forced_user_enrollment", forced_user_enrollment);
pub(crate) const FORCED_USER_ENROLLMENT_REJECTED: Action =
    Action::new("forced_user_enrollment_rejected", forced_user_enrollment_rejected);

pub(crate) const BEGIN_BRUTE_FORCE_COUNTER: Action =
    Action::new("begin_brute_force_counter", begin_brute_force_counter);
pub(crate) const BEGIN_MIN_PIN_COUNTER: Action =
    Action::new("begin_min_pin_counter", begin_min_pin_counter);
pub(crate) const BEGIN_AUTO_LOCK_COUNTER: Action =
    Action::new("begin_auto_lock_counter", begin_auto_lock_counter);
pub(crate) const STORE_COUNTER: Action = Action::new("store_counter", store_counter);
pub(crate) const REJECT_COUNTER: Action = Action::new("reject_counter", reject_counter);
pub(crate) const COUNTER_ENROLLMENT_TIMED_OUT: Action =
    Action::new("counter_enrollment_timed_out", counter_enrollment_timed_out);
pub(crate) const CANCEL_COUNTER_ENROLLMENT: Action =
    Action::new("cancel_counter_enrollment", cancel_counter_enrollment);

pub(crate) const TOGGLE_BASIC_DISK: Action = Action::new("toggle_basic_disk", toggle_basic_disk);
pub(crate) const TOGGLE_REMOVABLE_MEDIA: Action =
    Action::new("toggle_removable_media", toggle_removable_media);
pub(crate) const ENABLE_LED_FLICKER: Action =
    Action::new("enable_led_flicker", enable_led_flicker);
pub(crate) const DISABLE_LED_FLICKER: Action =
    Action::new("disable_led_flicker", disable_led_flicker);
pub(crate) const TOGGLE_LOCK_OVERRIDE: Action =
    Action::new("toggle_lock_override", toggle_lock_override);
pub(crate) const TOGGLE_PROVISION_LOCK: Action =
    Action::new("toggle_provision_lock", toggle_provision_lock);
pub(crate) const SET_READ_ONLY: Action = Action::new("set_read_only", set_read_only);
pub(crate) const SET_READ_WRITE: Action = Action::new("set_read_write", set_read_write);
pub(crate) const ENABLE_SELF_DESTRUCT: Action =
    Action::new("enable_self_destruct", enable_self_destruct);
pub(crate) const ARM_FORCED_ENROLLMENT: Action =
    Action::new("arm_forced_enrollment", arm_forced_enrollment);
pub(crate) const DELETE_PINS: Action = Action::new("delete_pins", delete_pins);

// Power

fn power_up(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let usb3 = ctx.payload().usb3();
    ctx.power(PowerState::On { usb3 })?;
    if ctx.dest() == DeviceState::Post {
        ctx.expect(LedPattern::RedGreenBlue)?;
    }
    Ok(())
}

fn power_down(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.power(PowerState::Off)
}

/// The self test reports through the LEDs; the verdict is queued for the
/// driver to fire.
fn post_result(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    if ctx.observe(LedPattern::AcceptPattern)? {
        ctx.queue(Trigger::PostPass);
    } else {
        tracing::warn!("self test acceptance not observed");
        ctx.queue(Trigger::PostFail);
    }
    Ok(())
}

/// Confirms the indication of the state just entered.
fn confirm_arrival(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    match ctx.dest() {
        DeviceState::Off => {
            let (minimum, timeout) = (ctx.timing().off_minimum, ctx.timing().off_timeout);
            ctx.expect_stable_for(LedPattern::AllOff, minimum, timeout)
        },
        DeviceState::Oob => {
            ctx.expect_stable(LedPattern::GreenBlueState)?;
            ctx.expect_enumeration()
        },
        DeviceState::Standby => ctx.expect_stable(LedPattern::StandbyMode),
        DeviceState::UserForcedEnrollment => ctx.expect(LedPattern::GreenBlue),
        DeviceState::UnlockedAdmin | DeviceState::UnlockedUser => {
            let pattern = unlock_pattern(ctx);
            let timeout = ctx.timing().unlock;
            ctx.expect_within(pattern, timeout)?;
            ctx.expect_enumeration()
        },
        DeviceState::AdminMode => ctx.expect_stable(LedPattern::AdminMode),
        DeviceState::PinEnrollment => {
            let pattern = enrollment_prompt(ctx.dut().pending_enrollment());
            ctx.expect(pattern)
        },
        DeviceState::Diagnostic => ctx.expect(LedPattern::DiagnosticMode),
        DeviceState::BruteForce => ctx.expect(LedPattern::BruteForced),
        DeviceState::Error => ctx.expect(LedPattern::ErrorState),
        DeviceState::Post | DeviceState::CounterEnrollment | DeviceState::Bricked => Ok(()),
    }
}

fn unlock_pattern(ctx: &ActionContext<'_>) -> LedPattern {
    let flags = ctx.dut().flags();
    match (flags.read_only, flags.lock_override) {
        (true, true) => LedPattern::EnumLockOverrideReadOnly,
        (true, false) => LedPattern::EnumReadOnly,
        (false, true) => LedPattern::EnumLockOverride,
        (false, false) => LedPattern::Enum,
    }
}

fn enrollment_prompt(kind: Option<PendingEnrollment>) -> LedPattern {
    match kind {
        Some(PendingEnrollment::SelfDestruct) => LedPattern::RedBlue,
        _ => LedPattern::GreenBlue,
    }
}

// Locking, unlocking and resets

fn press_lock(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.chord(&[Key::Lock])
}

fn user_reset(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.chord(&[Key::Lock, Key::Unlock, Key::Key2])?;
    ctx.expect_stable(LedPattern::KeyGeneration)?;
    ctx.dut_mut().factory_reset();
    Ok(())
}

fn admin_pin(ctx: &ActionContext<'_>) -> Result<Pin, ActionError> {
    ctx.dut().admin_pin().cloned().ok_or(ActionError::MissingCredential { credential: "admin" })
}

fn admin_login(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let pin = admin_pin(ctx)?;
    ctx.hold(&[Key::Key0, Key::Unlock])?;
    ctx.expect(LedPattern::RedLogin)?;
    ctx.type_pin(&pin)?;
    ctx.dut_mut().reset_brute_force();
    Ok(())
}

fn enter_admin_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let pin = admin_pin(ctx)?;
    ctx.type_pin(&pin)?;
    ctx.dut_mut().reset_brute_force();
    Ok(())
}

fn enter_user_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let user_id = ctx.payload().user_id.ok_or(ActionError::MissingPayload { field: "user_id" })?;
    let pin = ctx
        .dut()
        .user_pin(user_id)
        .cloned()
        .ok_or(ActionError::MissingCredential { credential: "user" })?;
    ctx.type_pin(&pin)?;
    ctx.dut_mut().reset_brute_force();
    Ok(())
}

fn enter_self_destruct_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let pin = ctx
        .dut()
        .self_destruct_pin()
        .cloned()
        .ok_or(ActionError::MissingCredential { credential: "self-destruct" })?;
    ctx.type_pin(&pin)?;
    ctx.dut_mut().self_destruct();
    tracing::info!("self-destruct PIN promoted to admin");
    Ok(())
}

// Brute force

/// The PIN to type for a failed attempt: the payload's, or a run of zeros
/// that can never be enrolled. An enrolled payload PIN would unlock.
fn wrong_pin(ctx: &ActionContext<'_>) -> Result<Pin, ActionError> {
    if let Some(pin) = &ctx.payload().pin {
        if ctx.dut().is_enrolled(pin) {
            return Err(ActionError::EnrolledPin);
        }
        return Ok(pin.clone());
    }
    let len = usize::from(ctx.dut().counters().min_pin_length);
    Pin::new("0".repeat(len)).map_err(|_| ActionError::MissingPayload { field: "pin" })
}

fn failed_class(ctx: &ActionContext<'_>) -> CredentialClass {
    if ctx.payload().user_id.is_some() { CredentialClass::User } else { CredentialClass::Admin }
}

fn type_rejected_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let pin = wrong_pin(ctx)?;
    ctx.type_pin(&pin)?;
    ctx.expect(LedPattern::Reject)
}

fn enter_wrong_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    type_rejected_pin(ctx)?;
    let class = failed_class(ctx);
    let count = ctx.dut_mut().record_failed_unlock(class);
    tracing::info!(?class, count, "failed unlock recorded");
    Ok(())
}

fn fail_last_try_locked(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    type_rejected_pin(ctx)?;
    let class = failed_class(ctx);
    let dut = ctx.dut_mut();
    dut.record_failed_unlock(class);
    dut.exhaust_brute_force();
    tracing::warn!("last try failed under provision lock, awaiting admin recovery");
    Ok(())
}

fn fail_last_try_reset(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    type_rejected_pin(ctx)?;
    ctx.expect_stable(LedPattern::KeyGeneration)?;
    let class = failed_class(ctx);
    let dut = ctx.dut_mut();
    dut.record_failed_unlock(class);
    dut.exhaust_brute_force();
    dut.factory_reset();
    tracing::warn!("last try failed, device reset to factory defaults");
    Ok(())
}

fn enter_last_try(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.hold(&[Key::Key5, Key::Unlock])?;
    ctx.expect(LedPattern::RedGreen)?;
    ctx.keys(&LAST_TRY_PHRASE)?;
    ctx.dut_mut().spend_last_try();
    Ok(())
}

fn recovery_login(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let pin = ctx.payload().pin.clone().ok_or(ActionError::MissingPayload { field: "pin" })?;
    let slot = ctx
        .dut()
        .recovery_slot_for(&pin)
        .ok_or(ActionError::MissingCredential { credential: "recovery" })?;
    ctx.type_pin(&pin)?;
    ctx.expect(LedPattern::AcceptPattern)?;
    let dut = ctx.dut_mut();
    dut.consume_recovery_pin(slot);
    dut.reset_brute_force();
    dut.begin_enrollment(PendingEnrollment::Admin);
    tracing::info!(slot, "recovery PIN consumed");
    Ok(())
}

fn fail_recovery(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    type_rejected_pin(ctx)?;
    let attempts = ctx.dut_mut().record_failed_unlock(CredentialClass::Recovery);
    tracing::info!(attempts, "failed recovery attempt");
    Ok(())
}

fn fail_recovery_and_brick(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    fail_recovery(ctx)?;
    ctx.dut_mut().brick();
    tracing::warn!("recovery attempts exhausted, device bricked");
    Ok(())
}

// PIN enrollment

fn begin_enrollment(
    ctx: &mut ActionContext<'_>,
    chord: &[Key],
    kind: PendingEnrollment,
) -> Result<(), ActionError> {
    ctx.chord(chord)?;
    ctx.dut_mut().begin_enrollment(kind);
    Ok(())
}

fn begin_admin_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_enrollment(ctx, &[Key::Unlock, Key::Key9], PendingEnrollment::Admin)
}

fn begin_user_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_enrollment(ctx, &[Key::Unlock, Key::Key1], PendingEnrollment::User)
}

fn begin_recovery_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_enrollment(ctx, &[Key::Unlock, Key::Key7], PendingEnrollment::Recovery)
}

fn begin_self_destruct_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_enrollment(ctx, &[Key::Key3, Key::Unlock], PendingEnrollment::SelfDestruct)
}

fn new_pin(ctx: &ActionContext<'_>) -> Result<Pin, ActionError> {
    ctx.payload().new_pin.clone().ok_or(ActionError::MissingPayload { field: "new_pin" })
}

/// First entry, prompt for confirmation, second entry.
fn type_new_pin_twice(
    ctx: &mut ActionContext<'_>,
    prompt: LedPattern,
) -> Result<(), ActionError> {
    let first = new_pin(ctx)?;
    let confirm = ctx.payload().confirmation().cloned().unwrap_or_else(|| first.clone());
    ctx.type_pin(&first)?;
    ctx.expect(LedPattern::AcceptPattern)?;
    ctx.expect(prompt)?;
    ctx.type_pin(&confirm)
}

fn store_enrolled_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx
        .dut_mut()
        .take_pending_enrollment()
        .ok_or(ActionError::MissingPayload { field: "pending enrollment" })?;
    type_new_pin_twice(ctx, enrollment_prompt(Some(kind)))?;
    ctx.expect(LedPattern::AcceptState)?;

    let pin = new_pin(ctx)?;
    let dut = ctx.dut_mut();
    match kind {
        PendingEnrollment::Admin => dut.enroll_admin_pin(pin),
        PendingEnrollment::User => {
            let slot = dut.enroll_user_pin(pin);
            tracing::info!(?slot, "user PIN enrolled");
        },
        PendingEnrollment::Recovery => {
            let slot = dut.enroll_recovery_pin(pin);
            tracing::info!(?slot, "recovery PIN enrolled");
        },
        PendingEnrollment::SelfDestruct => dut.enroll_self_destruct_pin(pin),
    }
    tracing::info!(?kind, "PIN enrollment accepted");
    Ok(())
}

/// A refused first entry is rejected at once; a mismatched confirmation is
/// rejected after the second entry.
fn reject_enrolled_pin(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx.dut_mut().take_pending_enrollment();
    let pin = new_pin(ctx)?;
    let first_accepted = kind.is_some_and(|kind| {
        ctx.dut().slot_available(kind) && ctx.dut().pin_acceptable(&pin, kind)
    });
    if first_accepted {
        type_new_pin_twice(ctx, enrollment_prompt(kind))?;
    } else {
        ctx.type_pin(&pin)?;
    }
    ctx.expect(LedPattern::Reject)?;
    tracing::info!(?kind, "PIN enrollment rejected");
    Ok(())
}

fn pin_enrollment_timed_out(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx.dut_mut().take_pending_enrollment();
    ctx.expect(LedPattern::Reject)?;
    tracing::info!(?kind, "PIN enrollment timed out");
    Ok(())
}

fn cancel_pin_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx.dut_mut().take_pending_enrollment();
    press_lock(ctx)?;
    tracing::info!(?kind, "PIN enrollment cancelled");
    Ok(())
}

fn forced_user_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.chord(&[Key::Unlock, Key::Key1])?;
    ctx.expect(LedPattern::GreenBlue)?;
    type_new_pin_twice(ctx, LedPattern::GreenBlue)?;
    ctx.expect(LedPattern::AcceptState)?;
    let pin = new_pin(ctx)?;
    let slot = ctx.dut_mut().enroll_user_pin(pin);
    tracing::info!(?slot, "forced user enrollment completed");
    Ok(())
}

fn forced_user_enrollment_rejected(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.chord(&[Key::Unlock, Key::Key1])?;
    ctx.expect(LedPattern::GreenBlue)?;
    let pin = new_pin(ctx)?;
    ctx.type_pin(&pin)?;
    ctx.expect(LedPattern::Reject)
}

// Counter enrollment

fn begin_counter(
    ctx: &mut ActionContext<'_>,
    chord: &[Key],
    kind: CounterKind,
) -> Result<(), ActionError> {
    ctx.hold(chord)?;
    ctx.dut_mut().begin_counter(kind);
    Ok(())
}

fn begin_brute_force_counter(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_counter(ctx, &[Key::Unlock, Key::Key5], CounterKind::BruteForce)
}

fn begin_min_pin_counter(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_counter(ctx, &[Key::Unlock, Key::Key4], CounterKind::MinPinLength)
}

fn begin_auto_lock_counter(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    begin_counter(ctx, &[Key::Unlock, Key::Key6], CounterKind::UnattendedAutoLock)
}

/// Types the counter zero-padded to the digits the prompt expects.
fn type_counter(
    ctx: &mut ActionContext<'_>,
    kind: Option<CounterKind>,
) -> Result<u8, ActionError> {
    let value =
        ctx.payload().new_counter.ok_or(ActionError::MissingPayload { field: "new_counter" })?;
    let width = kind.map_or(2, CounterKind::digits);
    let keys: Vec<Key> = format!("{value:0width$}").chars().filter_map(Key::digit).collect();
    ctx.keys(&keys)?;
    Ok(value)
}

fn store_counter(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx
        .dut_mut()
        .take_pending_counter()
        .ok_or(ActionError::MissingPayload { field: "pending counter" })?;
    let value = type_counter(ctx, Some(kind))?;
    ctx.expect(LedPattern::AcceptPattern)?;
    ctx.dut_mut().set_counter(kind, value);
    tracing::info!(?kind, value, "counter enrolled");
    Ok(())
}

fn reject_counter(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx.dut_mut().take_pending_counter();
    let value = type_counter(ctx, kind)?;
    ctx.expect(LedPattern::Reject)?;
    tracing::info!(?kind, value, "counter rejected");
    Ok(())
}

fn counter_enrollment_timed_out(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx.dut_mut().take_pending_counter();
    ctx.expect(LedPattern::Reject)?;
    tracing::info!(?kind, "counter enrollment timed out");
    Ok(())
}

fn cancel_counter_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    let kind = ctx.dut_mut().take_pending_counter();
    press_lock(ctx)?;
    tracing::info!(?kind, "counter enrollment cancelled");
    Ok(())
}

// Admin mode toggles

/// Presses `chord`, waits for acceptance and sets `feature` to `value`, or
/// flips it when `value` is `None`.
fn apply_toggle(
    ctx: &mut ActionContext<'_>,
    chord: &[Key],
    feature: Feature,
    value: Option<bool>,
) -> Result<(), ActionError> {
    ctx.chord(chord)?;
    ctx.expect(LedPattern::AcceptPattern)?;
    let value = value.unwrap_or_else(|| !ctx.dut().feature(feature));
    ctx.dut_mut().set_feature(feature, value);
    tracing::info!(?feature, value, "feature set");
    Ok(())
}

fn toggle_basic_disk(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key2, Key::Key3], Feature::BasicDisk, None)
}

fn toggle_removable_media(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key3, Key::Key7], Feature::RemovableMedia, None)
}

fn enable_led_flicker(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key0, Key::Key3], Feature::LedFlicker, Some(true))
}

fn disable_led_flicker(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key0, Key::Key3], Feature::LedFlicker, Some(false))
}

fn toggle_lock_override(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key0, Key::Key3], Feature::LockOverride, None)
}

fn toggle_provision_lock(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key2, Key::Key5], Feature::ProvisionLock, None)
}

fn set_read_only(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key6, Key::Key7], Feature::ReadOnly, Some(true))
}

fn set_read_write(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key7, Key::Key9], Feature::ReadOnly, Some(false))
}

fn enable_self_destruct(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key4, Key::Key7], Feature::SelfDestruct, Some(true))
}

fn arm_forced_enrollment(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    apply_toggle(ctx, &[Key::Key0, Key::Key1], Feature::UserForcedEnrollment, Some(true))
}

/// Hold, confirm at the red/blue prompt, hold again.
fn delete_pins(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
    ctx.hold(&[Key::Key7, Key::Key8])?;
    ctx.expect(LedPattern::RedBlue)?;
    ctx.hold(&[Key::Key7, Key::Key8])?;
    ctx.expect(LedPattern::AcceptPattern)?;
    ctx.dut_mut().delete_pins();
    tracing::info!("user, recovery and self-destruct PINs deleted");
    Ok(())
}
