//! The interactive drive loop: render the controller, read one command,
//! issue the resulting fetch, apply its outcome, repeat. This is the only
//! place where engine tickets meet the HTTP client.

use std::io::Write;

use anyhow::Result;
use healthnav_backend_client::BackendClient;
use healthnav_cascade::CascadeController;
use healthnav_cascade::FetchTarget;
use healthnav_cascade::Flow;
use healthnav_cascade::Status;
use healthnav_cascade::flows::KpiFlow;
use healthnav_cascade::flows::ReferralFlow;
use healthnav_cascade::grouping;
use owo_colors::OwoColorize;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Quit,
    Clear,
    Back,
    Pick(usize),
    ToggleCategory(usize),
    Invalid,
}

fn parse_input(line: &str) -> Input {
    match line {
        "q" | "quit" => Input::Quit,
        "" => Input::Clear,
        "b" => Input::Back,
        _ => {
            if let Some(rest) = line.strip_prefix("t ") {
                rest.trim().parse().map(Input::ToggleCategory).unwrap_or(Input::Invalid)
            } else {
                line.parse().map(Input::Pick).unwrap_or(Input::Invalid)
            }
        }
    }
}

/// The tier the user is currently choosing: the first unselected one, or
/// the last tier when everything is selected (so it can be re-picked).
fn active_tier<F: Flow>(controller: &CascadeController<F>) -> usize {
    let last = controller.flow().tiers().len().saturating_sub(1);
    match controller.highest_selected_tier() {
        Some(tier) => (tier + 1).min(last),
        None => 0,
    }
}

fn print_status<F: Flow>(controller: &CascadeController<F>) {
    if controller.is_loading() {
        println!("{}", "Loading data...".blue());
    }
    match controller.status() {
        Status::Idle => {}
        Status::Info(message) => println!("{}", message.blue()),
        Status::Error(message) => println!("{} {}", "Error:".red().bold(), message.red()),
    }
}

fn print_prompt<F: Flow>(controller: &CascadeController<F>) -> Result<()> {
    let tier = active_tier(controller);
    let spec = controller.flow().tiers()[tier];
    let options = controller.options(tier);
    if options.is_empty() {
        println!("(no {} options loaded)", spec.label);
    } else {
        print!("{}", render::options_list(spec.label, options));
    }
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

pub async fn run_referral(client: BackendClient) -> Result<()> {
    let mut controller = CascadeController::new(ReferralFlow);
    let ticket = controller.bootstrap();
    let outcome = client.referral_options(0, &ticket.selections).await;
    controller.apply_options(&ticket, outcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!();
        print_status(&controller);
        if let Some(results) = controller.results() {
            println!("{}", render::referral_results(results));
        }
        print_prompt(&controller)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_input(line.trim()) {
            Input::Quit => break,
            Input::Clear => {
                controller.select(active_tier(&controller), "");
            }
            Input::Back => {
                let tier = active_tier(&controller);
                if tier > 0 {
                    controller.select(tier - 1, "");
                }
            }
            Input::Pick(choice) => {
                let tier = active_tier(&controller);
                let Some(value) = controller
                    .options(tier)
                    .get(choice.wrapping_sub(1))
                    .map(|option| option.value.clone())
                else {
                    println!("No such option.");
                    continue;
                };
                if let Some(ticket) = controller.select(tier, value) {
                    match ticket.target {
                        FetchTarget::Options(next) => {
                            let outcome = client.referral_options(next, &ticket.selections).await;
                            controller.apply_options(&ticket, outcome);
                        }
                        FetchTarget::Terminal => {
                            let outcome = client.referral_search_for(&ticket.selections).await;
                            controller.apply_terminal(&ticket, outcome);
                        }
                    }
                }
            }
            Input::ToggleCategory(_) | Input::Invalid => {
                println!("Enter an option number, blank to clear, b to go back, q to quit.");
            }
        }
    }
    Ok(())
}

pub async fn run_kpi(client: BackendClient) -> Result<()> {
    let mut controller = CascadeController::new(KpiFlow);
    let ticket = controller.bootstrap();
    let outcome = client.kpi_options(0, &ticket.selections).await;
    controller.apply_options(&ticket, outcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!();
        print_status(&controller);
        if let Some(rows) = controller.results() {
            print!(
                "{}",
                render::kpi_results(rows, |category| controller.is_expanded(category))
            );
            println!("(t <n> toggles a category)");
        }
        print_prompt(&controller)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_input(line.trim()) {
            Input::Quit => break,
            Input::Clear => {
                controller.select(active_tier(&controller), "");
            }
            Input::Back => {
                let tier = active_tier(&controller);
                if tier > 0 {
                    controller.select(tier - 1, "");
                }
            }
            Input::ToggleCategory(choice) => {
                let category = controller.results().and_then(|rows| {
                    let groups = grouping::group_by_category(rows);
                    grouping::sorted_category_names(&groups)
                        .into_iter()
                        .nth(choice.wrapping_sub(1))
                });
                if let Some(category) = category {
                    controller.toggle_category(&category);
                }
            }
            Input::Pick(choice) => {
                let tier = active_tier(&controller);
                let Some(value) = controller
                    .options(tier)
                    .get(choice.wrapping_sub(1))
                    .map(|option| option.value.clone())
                else {
                    println!("No such option.");
                    continue;
                };
                if let Some(ticket) = controller.select(tier, value) {
                    match ticket.target {
                        FetchTarget::Options(next) => {
                            let outcome = client.kpi_options(next, &ticket.selections).await;
                            controller.apply_options(&ticket, outcome);
                        }
                        FetchTarget::Terminal => {
                            let outcome = client.kpi_data_for(&ticket.selections).await;
                            controller.apply_terminal(&ticket, outcome);
                        }
                    }
                }
            }
            Input::Invalid => {
                println!("Enter an option number, blank to clear, b to go back, q to quit.");
            }
        }
    }
    Ok(())
}
