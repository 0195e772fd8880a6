//! Main module for the Square Rush application using Yew.
//! Wires the round hook, the game speed field and the view components.

use log::warn;
use square_rush::utils::validate_tick_interval;
use square_rush::RoundConfig;
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod hooks;

use components::{Board, ResultDialog, ScoreBoard, SpeedInput};
use hooks::{use_round, use_validated_input};

/// Primary game component.
#[function_component(Main)]
fn main_component() -> Html {
    let round = use_round(RoundConfig::default());
    let speed = use_validated_input(round.tick_interval_ms(), Rc::new(validate_tick_interval));

    // Push committed game speed into the controller
    {
        let round = round.clone();
        use_effect_with(speed.value, move |&interval_ms| {
            if interval_ms != round.tick_interval_ms() {
                if let Err(e) = round.set_tick_interval(interval_ms) {
                    warn!("Game speed not applied: {}", e);
                }
            }
        });
    }

    let running = round.is_running();

    html! {
        <div class="container">
            <h1>{ "Square Rush" }</h1>

            <div class="controls">
                <SpeedInput
                    text={speed.text.clone()}
                    interval_ms={round.tick_interval_ms()}
                    error={speed.error.clone()}
                    disabled={running}
                    oninput={speed.on_text_input.clone()}
                    oncommit={speed.on_commit.clone()}
                />
                <button
                    class="start-button"
                    disabled={running}
                    onclick={round.on_start.reform(|_: MouseEvent| ())}
                >
                    { "Start" }
                </button>
            </div>

            <ScoreBoard scores={round.scores()} threshold={round.score_threshold()} />

            <Board statuses={round.statuses()} onclick={round.on_cell_click.clone()} />

            if let Some(result) = round.result {
                <ResultDialog {result} onclose={round.on_dismiss.clone()} />
            }
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the app.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<Main>::new().render();
}
