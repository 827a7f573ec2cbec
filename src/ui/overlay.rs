/// Panel injected into the chat page by the content script

use crate::config::ExtensionConfig;
use crate::favorites::{Favourites, remove_favourite};
use crate::filters::{FilterOptions, any_filters_active, default_filters, toggle_option};
use crate::keys;
use crate::messages::{RuntimeMessage, is_close_key};
use crate::ui::components::TabButton;
use crate::ui::favorites::FavoritesView;
use crate::ui::hooks::use_synced_storage;
use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/storage.js")]
extern "C" {
    fn onRuntimeMessage(callback: &js_sys::Function) -> js_sys::Function;
}

#[derive(Clone, Copy, PartialEq)]
enum ActiveTab {
    Outline,
    Favorites,
}

#[derive(Properties, PartialEq)]
pub struct OverlayProps {
    #[prop_or_default]
    pub config: ExtensionConfig,
}

#[function_component(Overlay)]
pub fn overlay(props: &OverlayProps) -> Html {
    html! {
        <ContextProvider<ExtensionConfig> context={props.config.clone()}>
            <OverlayPanel />
        </ContextProvider<ExtensionConfig>>
    }
}

#[function_component(OverlayPanel)]
fn overlay_panel() -> Html {
    let is_open = use_synced_storage(keys::SIDEBAR_OPEN, false);
    let options = use_synced_storage::<FilterOptions>(keys::FILTER_OPTIONS, default_filters());
    let favourites = use_synced_storage(keys::FAVOURITED_CHATS, Favourites::new());
    let active_tab = use_state(|| ActiveTab::Outline);

    // Escape closes the panel; the background's toggle command flips it.
    {
        let is_open = is_open.clone();
        use_effect_with((), move |_| {
            let on_keydown = {
                let is_open = is_open.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    if is_close_key(&e.key()) {
                        is_open.set(false);
                    }
                }) as Box<dyn FnMut(KeyboardEvent)>)
            };

            let window = web_sys::window();
            if let Some(window) = &window {
                if let Err(e) = window
                    .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())
                {
                    log::warn!("Failed to listen for keydown: {:?}", e);
                }
            }

            let on_message = Closure::wrap(Box::new(move |kind: String| {
                match RuntimeMessage::from_type(&kind) {
                    RuntimeMessage::ToggleUi => is_open.update(|open| !open),
                    // Chat navigation is driven by the page integration.
                    RuntimeMessage::NextChat | RuntimeMessage::PreviousChat => {
                        log::debug!("Navigation message '{}' left to the page", kind)
                    }
                    RuntimeMessage::Other(kind) => log::debug!("Ignoring message '{}'", kind),
                }
            }) as Box<dyn FnMut(String)>);
            let stop_messages = onRuntimeMessage(on_message.as_ref().unchecked_ref());

            move || {
                if let Some(window) = &window {
                    if let Err(e) = window.remove_event_listener_with_callback(
                        "keydown",
                        on_keydown.as_ref().unchecked_ref(),
                    ) {
                        log::warn!("Failed to remove keydown listener: {:?}", e);
                    }
                }
                if let Err(e) = stop_messages.call0(&JsValue::NULL) {
                    log::warn!("Failed to remove message listener: {:?}", e);
                }
                drop(on_keydown);
                drop(on_message);
            }
        });
    }

    let on_toggle_open = {
        let is_open = is_open.clone();
        Callback::from(move |_: MouseEvent| is_open.update(|open| !open))
    };

    let on_close = {
        let is_open = is_open.clone();
        Callback::from(move |_: MouseEvent| is_open.set(false))
    };

    let on_remove = {
        let favourites = favourites.clone();
        Callback::from(move |id: String| {
            favourites.update(|old| remove_favourite(old, &id));
        })
    };

    let on_tab_click = {
        let active_tab = active_tab.clone();
        move |tab: ActiveTab| {
            let active_tab = active_tab.clone();
            Callback::from(move |_: MouseEvent| active_tab.set(tab))
        }
    };

    if !*is_open {
        return html! {
            <div class="chatgps-toggle" onclick={on_toggle_open} title="Toggle chatgps">
                {"🧭"}
            </div>
        };
    }

    let page_url = web_sys::window().and_then(|window| window.location().href().ok());
    let filter_class = if any_filters_active(&options) {
        "chatgps-filters chatgps-filters-active"
    } else {
        "chatgps-filters"
    };

    html! {
        <div class="chatgps-panel">
            <div class="chatgps-header">
                <span class="chatgps-title">{"ChatGPS"}</span>
                <Button onclick={on_close} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"✕"}
                </Button>
            </div>

            <div class={filter_class}>
                {for options.iter().map(|(label, enabled)| {
                    let onclick = {
                        let options = options.clone();
                        let label = label.clone();
                        Callback::from(move |e: MouseEvent| {
                            e.prevent_default();
                            options.update(|old| toggle_option(old, &label));
                        })
                    };
                    html! {
                        <label key={label.clone()} class="chatgps-filter" onclick={onclick}>
                            <input type="checkbox" checked={*enabled} />
                            {label}
                        </label>
                    }
                })}
            </div>

            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    <TabButton
                        label={"Minimap"}
                        active={*active_tab == ActiveTab::Outline}
                        onclick={on_tab_click(ActiveTab::Outline)}
                    />
                    <TabButton
                        label={"Favorites"}
                        active={*active_tab == ActiveTab::Favorites}
                        onclick={on_tab_click(ActiveTab::Favorites)}
                    />
                </ul>
            </div>

            <div class="tab-pane-content">
                {match *active_tab {
                    // The outline itself is rendered by the page integration.
                    ActiveTab::Outline => html! { <div id="chatgps-outline"></div> },
                    ActiveTab::Favorites => html! {
                        <FavoritesView
                            favourites={(*favourites).clone()}
                            on_remove={on_remove}
                            page_url={page_url}
                            show_external_link_button={true}
                        />
                    },
                }}
            </div>
        </div>
    }
}
