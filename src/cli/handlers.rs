use anyhow::{Context, Result, anyhow};
use chrono::{Local, Utc};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::calendar::{HijriDisplay, RamadanStatus, ramadan_status, resolve_hijri, resolve_ramadan_start};
use crate::cli::args::{AdminCommands, ConfigCommands, MediaCommands, NotificationCommands};
use crate::config::AppConfig;
use crate::db::SqliteRepository;
use crate::models::{
    AcademicLevel, DailyPrayerTimes, DelayConfig, MediaType, NotificationCategory, PrayerDelay,
    PrayerType, Priority, Program, QuestionCategory, WeeklyCategory,
};
use crate::prayer_times::Providers;
use crate::prayer_times::clock::{format_opt_12h, format_24h};
use crate::prayer_times::deriver::seconds_until;
use crate::services::admin::{AdminError, AdminGate, MediaDraft, NotificationDraft};
use crate::services::forms::{
    self, ContactForm, EnrollmentForm, FormError, MailDraft, QuestionForm, SubscriptionForm,
};
use crate::services::media::{self, MediaFilter};
use crate::services::notifications;
use crate::utils::format::{format_duration_secs, format_file_size};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn parse_list<T>(values: &[String]) -> Result<Vec<T>>
where
    T: FromStr<Err = anyhow::Error>,
{
    values.iter().map(|v| T::from_str(v.trim())).collect()
}

fn times_from(values: &[String]) -> DailyPrayerTimes {
    PrayerType::ALL
        .iter()
        .zip(values)
        .map(|(p, v)| (*p, v.clone()))
        .collect()
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(repo: &SqliteRepository, config: &AppConfig, providers: &Providers) -> Result<()> {
    let now = Local::now();
    let deriver = providers.load_schedule(repo, config, now.date_naive());
    let next = deriver.next_event(now.time());

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times for {} ({})",
        config.location.name,
        deriver.date().format("%A, %d %B %Y")
    );
    if deriver.is_explicit() {
        println_colored!(DIM, "  source: {} (adhan and iqaama set by hand)", deriver.source().label());
    } else {
        println_colored!(DIM, "  source: {}", deriver.source().label());
    }
    println!();
    println_colored!(DIM, "  {:<10}  {:>9}  {:>9}  {:>9}", "", "Time", "Adhan", "Iqaama");

    for slot in &deriver.schedule().slots {
        let line = format!(
            "  {:<10}  {:>9}  {:>9}  {:>9}",
            slot.prayer.display_name(),
            format_opt_12h(slot.prayer_minute),
            format_opt_12h(slot.call),
            format_opt_12h(slot.congregation)
        );
        if !next.tomorrow && slot.prayer == next.prayer {
            println_colored!(GREEN, "{}  ◀", line);
        } else {
            println_colored!(BOLD, "{}", line);
        }
    }

    print_next(&next, now.time());
    println!();
    Ok(())
}

fn print_next(next: &crate::models::NextEvent, now: chrono::NaiveTime) {
    println!();
    let when = if next.tomorrow { " (tomorrow)" } else { "" };
    match seconds_until(next, now) {
        Some(secs) => println_colored!(
            AMBER,
            "  Next: {} {} at {}{} in {}",
            next.prayer.display_name(),
            next.phase,
            format_opt_12h(next.minute),
            when,
            format_duration_secs(secs)
        ),
        None => println_colored!(AMBER, "  Next: {} {}{}", next.prayer.display_name(), next.phase, when),
    }
}

pub fn handle_next(repo: &SqliteRepository, config: &AppConfig, providers: &Providers) -> Result<()> {
    let now = Local::now();
    let deriver = providers.load_schedule(repo, config, now.date_naive());
    print_next(&deriver.next_event(now.time()), now.time());
    println!();
    Ok(())
}

// ─── Calendar ────────────────────────────────────────────────────────────────

pub fn handle_hijri(config: &AppConfig, providers: &Providers) -> Result<()> {
    let today = Local::now().date_naive();
    let hijri = resolve_hijri(providers.calendar(), today, config.location.hijri_offset);

    println!();
    match &hijri {
        HijriDisplay::Known(info) => {
            println_colored!(GOLD, "  {}", info.formatted());
            if let Some(ar) = &info.month_name_ar {
                println_colored!(DIM, "  {}", ar);
            }
            println_colored!(DIM, "  {}", today.format("%A, %d %B %Y"));
        }
        HijriDisplay::Unavailable => println_colored!(DIM, "  {}", hijri.formatted()),
    }
    println!();
    Ok(())
}

pub fn handle_ramadan(providers: &Providers) -> Result<()> {
    let now = Local::now().naive_local();
    let start = resolve_ramadan_start(providers.calendar(), now.date());
    let status = ramadan_status(start.date, now);

    println!();
    let color = match status {
        RamadanStatus::Active { .. } => GREEN,
        RamadanStatus::Distant { .. } => DIM,
        RamadanStatus::Countdown { .. } => AMBER,
    };
    println_colored!(GOLD, "  {}", status.headline());
    println_colored!(color, "  {}", status.detail());
    println_colored!(DIM, "  expected start: {} ({:?})", start.date.format("%d %B %Y"), start.source);
    println!();
    Ok(())
}

// ─── Admin ───────────────────────────────────────────────────────────────────

pub fn handle_admin(
    repo: &SqliteRepository,
    config: &AppConfig,
    providers: &Providers,
    password: Option<String>,
    action: &AdminCommands,
) -> Result<()> {
    let attempt = match password {
        Some(p) => p,
        None => prompt("Admin password: ")?,
    };
    let session = match AdminGate::new(&config.admin).unlock(&attempt) {
        Ok(session) => session,
        Err(e) => {
            println_colored!(RED, "  ✗ {}", e);
            return Ok(());
        }
    };

    let today = Local::now().date_naive();
    let result = match action {
        AdminCommands::SetTimes { adhan, iqaama } => {
            let mut deriver = providers.load_schedule(repo, config, today);
            session
                .set_call_times(repo, &mut deriver, &times_from(adhan), &times_from(iqaama))
                .map(|_| {
                    println_colored!(GREEN, "  ✓ Adhan and iqaama times set for {}", today);
                    print_schedule_summary(&deriver);
                })
        }
        AdminCommands::SetPrayers { times } => {
            let mut deriver = providers.load_schedule(repo, config, today);
            session
                .set_prayer_times(repo, &mut deriver, &times_from(times))
                .map(|_| {
                    println_colored!(GREEN, "  ✓ Prayer times set for {}", today);
                    print_schedule_summary(&deriver);
                })
        }
        AdminCommands::SetDelays { prayer, adhan, iqaama } => {
            let delay = PrayerDelay::new(*adhan, *iqaama);
            let patch = if prayer.iter().any(|p| p.eq_ignore_ascii_case("all")) {
                DelayConfig::uniform(delay)
            } else {
                let mut patch = DelayConfig::empty();
                for p in parse_list::<PrayerType>(prayer)? {
                    patch.set(p, delay);
                }
                patch
            };
            let mut deriver = providers.load_schedule(repo, config, today);
            session.set_delays(repo, &mut deriver, &patch).map(|merged| {
                println_colored!(GREEN, "  ✓ Delays updated");
                for p in PrayerType::ALL {
                    let d = merged.delay_for(p);
                    println_colored!(
                        DIM,
                        "    {:<10} adhan -{} min, iqaama +{} min",
                        p.display_name(),
                        d.call_offset,
                        d.congregation_offset
                    );
                }
            })
        }
        AdminCommands::ClearOverride => {
            let mut deriver = providers.load_schedule(repo, config, today);
            session
                .clear_override(repo, &mut deriver, providers.times())
                .map(|_| {
                    println_colored!(GREEN, "  ✓ Override cleared, using {}", deriver.source().label());
                })
        }
        AdminCommands::Notify {
            title,
            content,
            category,
            priority,
        } => {
            let draft = NotificationDraft {
                title: title.clone(),
                content: content.clone(),
                category: NotificationCategory::from_str(category)?,
                priority: Priority::from_str(priority)?,
            };
            session.post_notification(repo, &draft, Utc::now()).map(|n| {
                println_colored!(GREEN, "  ✓ Posted notice #{}: {}", n.id.unwrap_or_default(), n.title);
            })
        }
        AdminCommands::Upload {
            path,
            title,
            media_type,
            weekly_category,
            description,
            teacher,
        } => {
            let draft = MediaDraft {
                title: title.clone(),
                media_type: MediaType::from_str(media_type)?,
                weekly_category: weekly_category
                    .as_deref()
                    .map(WeeklyCategory::from_str)
                    .transpose()?,
                description: description.clone(),
                teacher: teacher.clone(),
            };
            session.upload_media(repo, &draft, path, Utc::now()).map(|item| {
                println_colored!(
                    GREEN,
                    "  ✓ Uploaded #{} {} ({})",
                    item.id.unwrap_or_default(),
                    item.title,
                    format_file_size(item.file_size)
                );
            })
        }
        AdminCommands::Subscribers => session.subscribers(repo).map(|subs| {
            println!();
            println_colored!(GOLD, "  Subscribers ({})", subs.len());
            for s in &subs {
                let topics: Vec<_> = s.categories.iter().map(|c| c.label()).collect();
                let status = if s.active { "" } else { "  (inactive)" };
                println_colored!(BOLD, "    {} <{}>{}", s.name, s.email, status);
                println_colored!(DIM, "      {} · since {}", topics.join(", "), s.subscribed_at.format("%d/%m/%Y"));
            }
            println!();
        }),
        AdminCommands::Questions => session.questions(repo).map(|questions| {
            println!();
            println_colored!(GOLD, "  Questions ({})", questions.len());
            for q in &questions {
                let category = q.category.map(|c| c.label()).unwrap_or("General");
                println_colored!(BOLD, "    {} [{}]", q.subject, category);
                println_colored!(
                    DIM,
                    "      from {} <{}> to {} · {}",
                    q.name.as_deref().unwrap_or("Anonymous"),
                    q.email,
                    q.teacher,
                    q.submitted_at.format("%d/%m/%Y %H:%M")
                );
            }
            println!();
        }),
        AdminCommands::Enrollments => session.enrollments(repo).map(|enrollments| {
            println!();
            println_colored!(GOLD, "  Enrollment requests ({})", enrollments.len());
            for e in &enrollments {
                let programs: Vec<_> = e.programs.iter().map(|p| p.label()).collect();
                println_colored!(BOLD, "    {} <{}> {}", e.name, e.email, e.phone);
                println_colored!(
                    DIM,
                    "      {} · {} · {}",
                    programs.join(", "),
                    e.level.label(),
                    e.submitted_at.format("%d/%m/%Y")
                );
            }
            println!();
        }),
    };

    match result {
        Ok(()) => Ok(()),
        Err(AdminError::Store(e)) => Err(e).context("Accessing the store"),
        Err(e) => {
            println_colored!(RED, "  ✗ {}", e);
            Ok(())
        }
    }
}

fn print_schedule_summary(deriver: &crate::prayer_times::ScheduleDeriver) {
    for slot in &deriver.schedule().slots {
        println_colored!(
            DIM,
            "    {:<10} adhan {}  iqaama {}",
            slot.prayer.display_name(),
            slot.call.map(format_24h).unwrap_or_else(|| "--:--".to_string()),
            slot.congregation.map(format_24h).unwrap_or_else(|| "--:--".to_string())
        );
    }
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub fn handle_notifications(repo: &SqliteRepository, action: Option<&NotificationCommands>) -> Result<()> {
    match action.unwrap_or(&NotificationCommands::List) {
        NotificationCommands::List => {
            let notices = notifications::list_notices(repo, Utc::now());
            println!();
            if notices.is_empty() {
                println_colored!(DIM, "  No notifications yet.");
                println!();
                return Ok(());
            }
            println_colored!(
                GOLD,
                "  Notifications ({} unread)",
                notifications::unread_count(&notices)
            );
            for n in &notices {
                println!();
                let marker = if n.unread { "●" } else { " " };
                let badge = n.badge.map(|b| format!(" [{}]", b)).unwrap_or_default();
                println_colored!(
                    AMBER,
                    "  {} #{} {}{}",
                    marker,
                    n.id.unwrap_or_default(),
                    n.label,
                    badge
                );
                println_colored!(BOLD, "    {}", n.title);
                if !n.content.is_empty() {
                    println!("    {}", n.content);
                }
                println_colored!(DIM, "    {}", n.age);
            }
            println!();
        }
        NotificationCommands::Read { id } => {
            if notifications::mark_read(repo, *id)? {
                println_colored!(GREEN, "  ✓ Notice #{} marked as read", id);
            } else {
                println_colored!(RED, "  ✗ No notice with id {}", id);
            }
        }
    }
    Ok(())
}

// ─── Media ───────────────────────────────────────────────────────────────────

fn print_media_line(item: &crate::models::MediaItem) {
    let by = if item.teacher.is_empty() {
        String::new()
    } else {
        format!(" - {}", item.teacher)
    };
    println_colored!(
        BOLD,
        "    #{:<4} {}{}",
        item.id.unwrap_or_default(),
        item.title,
        by
    );
    println_colored!(
        DIM,
        "          {} · {} · {} · {} downloads",
        item.media_type.label(),
        item.file_name,
        format_file_size(item.file_size),
        item.download_count
    );
}

pub fn handle_media(repo: &SqliteRepository, action: &MediaCommands) -> Result<()> {
    match action {
        MediaCommands::List { media_type } => {
            let filter = MediaFilter::from_str(media_type)?;
            let listing = media::list_media(repo, filter).context("Loading media")?;
            println!();
            if listing.is_empty() {
                println_colored!(DIM, "  No media found.");
                println!();
                return Ok(());
            }
            for (category, items) in &listing.weekly {
                println_colored!(GOLD, "  {}", category.title());
                items.iter().for_each(print_media_line);
                println!();
            }
            if !listing.items.is_empty() {
                if !listing.weekly.is_empty() {
                    println_colored!(GOLD, "  Other media");
                }
                listing.items.iter().for_each(print_media_line);
                println!();
            }
        }
        MediaCommands::Download { id, dir } => match media::download(repo, *id, dir) {
            Ok(path) => println_colored!(GREEN, "  ✓ Saved {}", path.display()),
            Err(media::MediaError::NotFound(id)) => {
                println_colored!(RED, "  ✗ No media item with id {}", id)
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

// ─── Forms ───────────────────────────────────────────────────────────────────

fn report_form_error(e: FormError) -> Result<()> {
    match e {
        FormError::Store(e) => Err(e).context("Saving submission"),
        other => {
            println_colored!(RED, "  ✗ {}", other);
            Ok(())
        }
    }
}

fn print_draft(draft: &MailDraft) {
    println_colored!(BOLD, "  To: {} <{}>", draft.recipient, draft.to);
    println_colored!(BOLD, "  Subject: {}", draft.subject);
    println_colored!(DIM, "  Open this link to send it from your mail client:");
    println!("  {}", draft.mailto());
}

pub fn handle_subscribe(
    repo: &SqliteRepository,
    name: &str,
    email: &str,
    phone: Option<&str>,
    categories: &[String],
) -> Result<()> {
    let form = SubscriptionForm {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.map(str::to_string),
        categories: parse_list::<NotificationCategory>(categories)?,
    };
    match forms::submit_subscription(repo, &form, Utc::now()) {
        Ok(sub) => {
            println!();
            println_colored!(GREEN, "  ✓ Successfully subscribed!");
            for c in &sub.categories {
                println!("    • {}", c.subscription_label());
            }
            let channel = if sub.phone.is_some() { "email and SMS" } else { "email" };
            println_colored!(DIM, "  You will receive notifications via {}.", channel);
            println!();
            Ok(())
        }
        Err(e) => report_form_error(e),
    }
}

pub fn handle_ask(repo: &SqliteRepository, config: &AppConfig, form: QuestionForm) -> Result<()> {
    match forms::submit_question(repo, &config.contacts, &form, Utc::now()) {
        Ok(draft) => {
            println!();
            println_colored!(GREEN, "  ✓ Question prepared for {}", draft.recipient);
            print_draft(&draft);
            println!();
            Ok(())
        }
        Err(e) => report_form_error(e),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_enroll(
    repo: &SqliteRepository,
    config: &AppConfig,
    programs: &[String],
    name: &str,
    email: &str,
    phone: &str,
    level: &str,
    year: Option<&str>,
    message: Option<&str>,
) -> Result<()> {
    let form = EnrollmentForm {
        programs: parse_list::<Program>(programs)?,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        level: Some(AcademicLevel::from_str(level)?),
        year: year.map(str::to_string),
        message: message.map(str::to_string),
    };
    match forms::submit_enrollment(repo, &config.contacts, &form, Utc::now()) {
        Ok(drafts) => {
            println!();
            println_colored!(
                GREEN,
                "  ✓ Enrollment request{} prepared",
                if drafts.len() > 1 { "s" } else { "" }
            );
            for draft in &drafts {
                println!();
                print_draft(draft);
            }
            println!();
            Ok(())
        }
        Err(e) => report_form_error(e),
    }
}

pub fn handle_contact(config: &AppConfig, form: ContactForm) -> Result<()> {
    match forms::compose_contact(&config.contacts, &form, Utc::now()) {
        Ok(draft) => {
            println!();
            print_draft(&draft);
            println!();
            Ok(())
        }
        Err(e) => report_form_error(e),
    }
}

pub fn question_form(
    subject: &str,
    question: &str,
    category: Option<&str>,
    teacher: Option<&str>,
    name: Option<&str>,
    email: &str,
    phone: Option<&str>,
) -> Result<QuestionForm> {
    Ok(QuestionForm {
        subject: subject.to_string(),
        content: question.to_string(),
        category: category.map(QuestionCategory::from_str).transpose()?,
        teacher: teacher.map(str::to_string),
        name: name.map(str::to_string),
        email: email.to_string(),
        phone: phone.map(str::to_string),
    })
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, action: &ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path()?.display());
        }
        ConfigCommands::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigCommands::Init { force } => {
            let path = AppConfig::config_path()?;
            if path.exists() && !force {
                println_colored!(AMBER, "  {} already exists (use --force to replace it)", path.display());
                return Ok(());
            }
            config.save()?;
            println_colored!(GREEN, "  ✓ Wrote {}", path.display());
        }
    }
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    if buf.is_empty() {
        return Err(anyhow!("No input"));
    }
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
