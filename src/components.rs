//! Pure Yew view components for the Square Rush UI.
//!
//! Everything here renders from props; the round itself lives in
//! [`crate::hooks::use_round`].

use square_rush::config::BOARD_COLUMNS;
use square_rush::utils::format_interval;
use square_rush::{CellStatus, RoundResult};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BoardProps {
    pub statuses: Vec<CellStatus>,
    pub onclick: Callback<usize>,
}

/// Grid of clickable squares coloured by status.
#[function_component(Board)]
pub fn board(props: &BoardProps) -> Html {
    let style = format!("grid-template-columns: repeat({}, 40px);", BOARD_COLUMNS);
    html! {
        <div class="board" {style}>
            { props.statuses.iter().enumerate().map(|(index, status)| {
                let onclick = props.onclick.reform(move |_: MouseEvent| index);
                html! {
                    <div key={index}
                        class={classes!("cell", status.css_class())}
                        {onclick}
                    />
                }
            }).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ScoreBoardProps {
    pub scores: RoundResult,
    pub threshold: usize,
}

#[function_component(ScoreBoard)]
pub fn score_board(props: &ScoreBoardProps) -> Html {
    html! {
        <div class="score-board">
            <span class="score-player">{ format!("You: {}", props.scores.player_score) }</span>
            <span class="score-misses">{ format!("Computer: {}", props.scores.miss_score) }</span>
            <span class="score-target">{ format!("First to {}", props.threshold) }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SpeedInputProps {
    pub text: String,
    pub interval_ms: u32,
    pub error: Option<String>,
    pub disabled: bool,
    pub oninput: Callback<InputEvent>,
    pub oncommit: Callback<()>,
}

/// Game speed field; locked while a round is running.
#[function_component(SpeedInput)]
pub fn speed_input(props: &SpeedInputProps) -> Html {
    let onkeydown = {
        let commit = props.oncommit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                commit.emit(());
            }
        })
    };

    html! {
        <div class="form-group">
            <label for="game_speed_input">{ "Game speed:" }</label>
            <input
                type="text"
                id="game_speed_input"
                value={props.text.clone()}
                class={if props.error.is_some() { "invalid" } else { "" }}
                placeholder="1000, 750ms, 1.5s"
                disabled={props.disabled}
                oninput={props.oninput.clone()}
                onchange={props.oncommit.reform(|_: Event| ())}
                {onkeydown}
            />
            <span class="speed-value">{ format_interval(props.interval_ms) }</span>
            if let Some(ref err) = props.error {
                <div class="input-error">{ err }</div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultDialogProps {
    pub result: RoundResult,
    pub onclose: Callback<()>,
}

/// Modal shown once per finished round.
#[function_component(ResultDialog)]
pub fn result_dialog(props: &ResultDialogProps) -> Html {
    let verdict = if props.result.player_won() {
        "You win!"
    } else {
        "The computer wins."
    };

    html! {
        <div class="dialog-backdrop">
            <div class="dialog" role="dialog">
                <h2>{ verdict }</h2>
                <p>{ format!("Your score: {}", props.result.player_score) }</p>
                <p>{ format!("Computer score: {}", props.result.miss_score) }</p>
                <button onclick={props.onclose.reform(|_: MouseEvent| ())}>{ "Close" }</button>
            </div>
        </div>
    }
}
