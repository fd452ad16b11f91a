use chrono::Local;

use crate::ai;
use crate::billing::{self, BillingCycle};
use crate::cli::open_store;
use crate::error::{Result, TallyError};
use crate::models::PlanTier;
use crate::settings::load_settings;

pub fn show() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let plan = store.plan()?;
    let limit = plan.daily_ai_limit();
    let today = Local::now().format("%Y-%m-%d").to_string();
    let remaining = ai::remaining_quota(&store, &today)?;

    println!("Plan:       {}", plan.label());
    println!("Assistant:  {} questions per day ({} left today)", limit, remaining);
    if plan == PlanTier::Free {
        println!();
        println!("Upgrade with `tally plan upgrade --tier pro`.");
    }
    Ok(())
}

pub fn set(tier: &str) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let plan = PlanTier::parse(tier).ok_or_else(|| {
        TallyError::Validation("plan must be free, pro or enterprise".to_string())
    })?;
    store.set_plan(plan)?;
    println!("Plan set to {}.", plan.label());
    Ok(())
}

pub fn upgrade(tier: &str, cycle: &str) -> Result<()> {
    let settings = load_settings();
    open_store(&settings)?;

    let plan = PlanTier::parse(tier).ok_or_else(|| {
        TallyError::Validation("plan must be free, pro or enterprise".to_string())
    })?;
    if plan == PlanTier::Free {
        return Err(TallyError::Validation("choose pro or enterprise to upgrade".to_string()));
    }
    let cycle = BillingCycle::parse(cycle).ok_or_else(|| {
        TallyError::Validation("cycle must be monthly or annual".to_string())
    })?;
    if settings.user_id.is_empty() {
        return Err(TallyError::Other(
            "No user id in settings. Run `tally init` again.".to_string(),
        ));
    }

    let url = billing::start_checkout(
        settings.billing_endpoint().as_deref(),
        plan,
        cycle,
        &settings.user_id,
    )?;
    println!("Open this URL to finish checkout ({} {}):", plan.label(), cycle.as_str());
    println!("{url}");
    println!();
    println!("Once payment completes, run `tally plan set {}`.", plan.as_str());
    Ok(())
}

pub fn portal() -> Result<()> {
    let settings = load_settings();
    open_store(&settings)?;

    if settings.user_id.is_empty() {
        return Err(TallyError::Other(
            "No user id in settings. Run `tally init` again.".to_string(),
        ));
    }
    let url = billing::portal_url(settings.billing_endpoint().as_deref(), &settings.user_id)?;
    println!("Manage your subscription here:");
    println!("{url}");
    Ok(())
}
