/// Reusable UI components

use crate::favorites::Provider;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ProviderIconProps {
    pub provider: Provider,
}

#[function_component(ProviderIcon)]
pub fn provider_icon(props: &ProviderIconProps) -> Html {
    let label = props.provider.label();

    html! {
        <div class="provider-icon" title={label}>
            if let Some(src) = props.provider.favicon_url() {
                <img src={src} alt={label} style="width: 12px; height: 12px; object-fit: contain;" />
            } else {
                <span class="provider-icon-fallback">{"?"}</span>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
    pub message: String,
    #[prop_or_default]
    pub hint: Option<String>,
}

#[function_component(EmptyState)]
pub fn empty_state(props: &EmptyStateProps) -> Html {
    html! {
        <div class="empty-state">
            <p>{&props.message}</p>
            if let Some(hint) = &props.hint {
                <p class="empty-state-hint">{hint}</p>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TabButtonProps {
    pub label: String,
    pub active: bool,
    pub onclick: Callback<MouseEvent>,
}

#[function_component(TabButton)]
pub fn tab_button(props: &TabButtonProps) -> Html {
    let class = if props.active {
        "pf-v5-c-tabs__item pf-m-current"
    } else {
        "pf-v5-c-tabs__item"
    };

    html! {
        <li class={class}>
            <button class="pf-v5-c-tabs__link" onclick={props.onclick.clone()}>
                <span class="pf-v5-c-tabs__item-text">{&props.label}</span>
            </button>
        </li>
    }
}
