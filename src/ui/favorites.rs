/// Favorites list, shared by the overlay tab and the standalone favorites page

use crate::config::ExtensionConfig;
use crate::favorites::{EXPORT_FILE_NAME, FavouritedChat, Favourites, export_json, remove_favourite};
use crate::keys;
use crate::ui::components::{EmptyState, ProviderIcon};
use crate::ui::hooks::use_synced_storage;
use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/storage.js")]
extern "C" {
    fn exportToFile(data: &str, filename: &str);

    fn extensionUrl(path: &str) -> String;
}

/// Extension-relative path of the standalone favorites page
pub const FAVORITES_PAGE: &str = "/favorites.html";

#[derive(Properties, PartialEq)]
pub struct FavoritesViewProps {
    pub favourites: Favourites,
    pub on_remove: Callback<String>,
    /// URL of the chat page hosting the view, if any
    #[prop_or_default]
    pub page_url: Option<String>,
    /// Offer a button that opens the standalone favorites page
    #[prop_or(false)]
    pub show_external_link_button: bool,
}

#[function_component(FavoritesView)]
pub fn favorites_view(props: &FavoritesViewProps) -> Html {
    let export_error = use_state(|| None::<String>);

    let on_save = {
        let favourites = props.favourites.clone();
        let export_error = export_error.clone();

        Callback::from(move |_| match export_json(&favourites) {
            Ok(json) => {
                exportToFile(&json, EXPORT_FILE_NAME);
                export_error.set(None);
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                export_error.set(Some(format!("Export failed: {}", e)));
            }
        })
    };

    let on_open_page = Callback::from(|_: MouseEvent| open_favorites_page());

    html! {
        <div class="favorites-view">
            <div class="favorites-toolbar">
                <Button onclick={on_save} variant={ButtonVariant::Secondary}>
                    {"Save JSON"}
                </Button>
                if props.show_external_link_button {
                    <Button onclick={on_open_page} variant={ButtonVariant::Secondary}>
                        {"Open in new tab ↗"}
                    </Button>
                }
            </div>

            if let Some(err) = (*export_error).clone() {
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {err}
                </Alert>
            }

            if props.favourites.is_empty() {
                <EmptyState message={"No favorites yet."} />
            } else {
                <div class="favorites-list">
                    {for props.favourites.iter().map(|(id, chat)| html! {
                        <FavItem
                            key={id.clone()}
                            unique_key={id.clone()}
                            chat={chat.clone()}
                            page_url={props.page_url.clone()}
                            on_remove={props.on_remove.clone()}
                        />
                    })}
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct FavItemProps {
    unique_key: String,
    chat: FavouritedChat,
    page_url: Option<String>,
    on_remove: Callback<String>,
}

#[function_component(FavItem)]
fn fav_item(props: &FavItemProps) -> Html {
    let chat = &props.chat;
    let on_page = props
        .page_url
        .as_deref()
        .is_some_and(|url| chat.is_on_page(url));

    let on_open = {
        let chat = chat.clone();
        Callback::from(move |_: MouseEvent| go_to_favourite(&chat, on_page))
    };

    let on_remove = {
        let unique_key = props.unique_key.clone();
        let on_remove = props.on_remove.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_remove.emit(unique_key.clone());
        })
    };

    let class = if on_page { "fav-item fav-item-current" } else { "fav-item" };

    html! {
        <div class={class} onclick={on_open} title={chat.title.clone().unwrap_or_else(|| chat.preview.clone())}>
            if !on_page {
                <span class="fav-item-external">{"↗"}</span>
            }
            <ProviderIcon provider={chat.provider()} />
            <span class="fav-item-preview">{&chat.preview}</span>
            <Button onclick={on_remove} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                {"★"}
            </Button>
        </div>
    }
}

fn go_to_favourite(chat: &FavouritedChat, on_page: bool) {
    let Some(window) = web_sys::window() else {
        return;
    };

    if on_page {
        // Scrolling the chat container belongs to the content script.
        log::debug!("Favourite {} is on this page at {}", chat.chat_id, chat.scroll_top);
        return;
    }

    if let Err(e) = window.open_with_url_and_target(&chat.open_url(), "_blank") {
        log::error!("Failed to open {}: {:?}", chat.open_url(), e);
    }
}

fn open_favorites_page() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let url = extensionUrl(FAVORITES_PAGE);
    if let Err(e) = window.open_with_url_and_target(&url, "_blank") {
        log::error!("Failed to open {}: {:?}", url, e);
    }
}

#[derive(Properties, PartialEq)]
pub struct FavoritesPageProps {
    #[prop_or_default]
    pub config: ExtensionConfig,
}

/// Standalone favorites page
#[function_component(FavoritesPage)]
pub fn favorites_page(props: &FavoritesPageProps) -> Html {
    html! {
        <ContextProvider<ExtensionConfig> context={props.config.clone()}>
            <FavoritesPageBody />
        </ContextProvider<ExtensionConfig>>
    }
}

#[function_component(FavoritesPageBody)]
fn favorites_page_body() -> Html {
    let favourites = use_synced_storage(keys::FAVOURITED_CHATS, Favourites::new());

    let on_remove = {
        let favourites = favourites.clone();
        Callback::from(move |id: String| {
            favourites.update(|old| remove_favourite(old, &id));
        })
    };

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"Chat GPS Favorites"}</h1>
            </div>

            <FavoritesView favourites={(*favourites).clone()} on_remove={on_remove} />

            <div class="footer">
                {format!("{} favorites", favourites.len())}
            </div>
        </div>
    }
}
