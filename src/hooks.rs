use log::warn;
use square_rush::scheduler::IntervalScheduler;
use square_rush::{
    CellStatus, ResultPresenter, RoundConfig, RoundController, RoundError, RoundResult,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Holds the state and callbacks for a validated input field.
#[derive(Clone)]
pub struct ValidatedInput<T: Clone + PartialEq + 'static> {
    /// The current text content of the input field.
    pub text: String,
    /// The last successfully parsed value.
    pub value: T,
    /// Set when the last commit failed validation.
    pub error: Option<String>,
    /// `oninput` handler keeping `text` in sync with the field.
    pub on_text_input: Callback<InputEvent>,
    /// Parses and validates the current text (Enter key or `onchange`).
    pub on_commit: Callback<()>,
}

/// State for a text field that only publishes values passing `parse_and_validate`.
#[hook]
pub fn use_validated_input<T: Clone + PartialEq + std::fmt::Display + 'static>(
    initial_value: T,
    parse_and_validate: Rc<dyn Fn(&str) -> Result<T, String>>,
) -> ValidatedInput<T> {
    let initial_text = initial_value.to_string();
    let value_handle = use_state(move || initial_value);
    let text_handle = use_state(move || initial_text);
    let error_handle = use_state(|| None::<String>);

    let on_text_input = {
        let text_setter = text_handle.setter();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    let on_commit = {
        let current_text = text_handle.clone();
        let value_setter = value_handle.setter();
        let text_setter = text_handle.setter();
        let error_setter = error_handle.setter();
        Callback::from(move |_| match parse_and_validate(&current_text) {
            Ok(parsed) => {
                // Show the canonical form of what was accepted
                text_setter.set(parsed.to_string());
                value_setter.set(parsed);
                error_setter.set(None);
            }
            Err(message) => error_setter.set(Some(message)),
        })
    };

    ValidatedInput {
        text: (*text_handle).clone(),
        value: (*value_handle).clone(),
        error: (*error_handle).clone(),
        on_text_input,
        on_commit,
    }
}

/// Hands finished rounds to the result dialog.
///
/// The emission is deferred so the dialog state is updated after the
/// controller has released its borrow.
pub struct DialogPresenter {
    on_result: Callback<RoundResult>,
}

impl DialogPresenter {
    pub fn new(on_result: Callback<RoundResult>) -> Self {
        Self { on_result }
    }
}

impl ResultPresenter for DialogPresenter {
    fn present(&mut self, result: RoundResult) {
        let on_result = self.on_result.clone();
        wasm_bindgen_futures::spawn_local(async move {
            on_result.emit(result);
        });
    }
}

pub type GameController = RoundController<IntervalScheduler, DialogPresenter>;

/// Shared handle to the round running in the current component.
#[derive(Clone)]
pub struct RoundHandle {
    controller: Rc<RefCell<GameController>>,
    force_update: UseForceUpdateHandle,
    /// Result of the last finished round, until dismissed.
    pub result: Option<RoundResult>,
    pub on_start: Callback<()>,
    pub on_cell_click: Callback<usize>,
    pub on_dismiss: Callback<()>,
}

impl RoundHandle {
    pub fn statuses(&self) -> Vec<CellStatus> {
        self.controller.borrow().statuses()
    }

    pub fn scores(&self) -> RoundResult {
        self.controller.borrow().scores()
    }

    pub fn is_running(&self) -> bool {
        self.controller.borrow().is_running()
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.controller.borrow().tick_interval_ms()
    }

    pub fn score_threshold(&self) -> usize {
        self.controller.borrow().score_threshold()
    }

    pub fn set_tick_interval(&self, interval_ms: u32) -> Result<(), RoundError> {
        let outcome = self.controller.borrow_mut().set_tick_interval(interval_ms);
        self.force_update.force_update();
        outcome
    }
}

/// Build a tick callback that only holds a weak reference, so the
/// controller and its scheduler are dropped with the component.
fn tick_callback(
    controller: Weak<RefCell<GameController>>,
    force_update: UseForceUpdateHandle,
) -> Callback<()> {
    Callback::from(move |_| {
        let Some(controller) = controller.upgrade() else {
            return;
        };
        controller.borrow_mut().tick();
        force_update.force_update();
    })
}

/// Owns a [`GameController`] for the lifetime of the calling component.
#[hook]
pub fn use_round(config: RoundConfig) -> RoundHandle {
    let force_update = use_force_update();
    let result = use_state(|| None::<RoundResult>);

    let controller = {
        let force_update = force_update.clone();
        let result_setter = result.setter();
        use_memo((), move |_| {
            Rc::new_cyclic(|weak: &Weak<RefCell<GameController>>| {
                let scheduler = IntervalScheduler::new(tick_callback(weak.clone(), force_update));
                let presenter = DialogPresenter::new(Callback::from(move |finished| {
                    result_setter.set(Some(finished));
                }));
                RefCell::new(RoundController::new(config, scheduler, presenter))
            })
        })
    };
    let controller: Rc<RefCell<GameController>> = (*controller).clone();

    let on_start = {
        let controller = controller.clone();
        let force_update = force_update.clone();
        let result_setter = result.setter();
        Callback::from(move |_| {
            let outcome = controller.borrow_mut().start();
            match outcome {
                Ok(()) => result_setter.set(None),
                Err(e) => warn!("Could not start round: {}", e),
            }
            force_update.force_update();
        })
    };

    let on_cell_click = {
        let controller = controller.clone();
        let force_update = force_update.clone();
        Callback::from(move |index: usize| {
            let scored = controller.borrow_mut().on_cell_click(index);
            if scored {
                force_update.force_update();
            }
        })
    };

    let on_dismiss = {
        let result_setter = result.setter();
        Callback::from(move |_| result_setter.set(None))
    };

    RoundHandle {
        controller,
        force_update,
        result: *result,
        on_start,
        on_cell_click,
        on_dismiss,
    }
}
