use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use gloo_net::http::Request;
use gloo_file::{File, FileList};
use gloo_timers::future::TimeoutFuture;
use web_sys::{DragEvent, Event, FormData, ProgressEvent, XmlHttpRequest};

use std::cell::RefCell;
use std::rc::Rc;

use crate::delete::{DeleteRow, DeleteVerdict};
use crate::selection::Selection;
use crate::settings::{SettingsForm, SizeUnit};
use crate::upload::UploadSession;
use crate::{ActionReply, FileEntry, HttpOutcome, StorageSettings, UploadReply};

const UPLOAD_REFRESH_DELAY_MS: u32 = 600;
const SETTINGS_REFRESH_DELAY_MS: u32 = 800;
const CONFIRM_DELETE: &str = "Delete this file? This cannot be undone.";

const EXPIRY_CHOICES: &[(&str, &str)] = &[
    ("1", "1 day"),
    ("3", "3 days"),
    ("7", "7 days"),
    ("15", "15 days"),
    ("30", "30 days"),
    ("forever", "forever"),
];

#[component]
pub fn App() -> impl IntoView {
    let files = read_initial_files();
    let (upload_open, set_upload_open) = create_signal(false);
    let (settings_open, set_settings_open) = create_signal(false);

    // Refresh is a full reload: the server is the source of truth for the
    // listing, so the view is never patched incrementally.
    let refresh = move || reload_view();

    view! {
        <div class="app">
            <StyleProvider />
            <div class="header-section border-container">
                <div class="header-row">
                    <div>
                        <h1>"stashr"</h1>
                        <p>"drop files, set limits, let them expire"</p>
                    </div>
                    <div class="header-actions">
                        <button
                            type="button"
                            class="open-btn border-container"
                            on:click=move |_| set_upload_open.set(true)
                        >
                            "upload"
                        </button>
                        <button
                            type="button"
                            class="open-btn border-container"
                            on:click=move |_| set_settings_open.set(true)
                        >
                            "settings"
                        </button>
                    </div>
                </div>
            </div>

            <div class="files-section border-container">
                <FilesSection files=files on_refresh=refresh />
            </div>

            <Show when=move || upload_open.get()>
                <UploadModal
                    on_close=move || set_upload_open.set(false)
                    on_refresh=refresh
                />
            </Show>

            <Show when=move || settings_open.get()>
                <SettingsModal
                    on_close=move || set_settings_open.set(false)
                    on_refresh=refresh
                />
            </Show>
        </div>
    }
}

#[component]
fn FilesSection<F>(files: Vec<FileEntry>, on_refresh: F) -> impl IntoView
where
    F: Fn() + Copy + 'static,
{
    if files.is_empty() {
        view! {
            <div class="empty-list">
                <div>"no files stored yet"</div>
                <div class="empty-hint">"upload some files to get started"</div>
            </div>
        }
        .into_view()
    } else {
        files
            .into_iter()
            .map(|entry| view! { <FileRow entry=entry on_refresh=on_refresh /> })
            .collect_view()
    }
}

#[component]
fn FileRow<F>(entry: FileEntry, on_refresh: F) -> impl IntoView
where
    F: Fn() + Copy + 'static,
{
    let id = entry.id;
    let (row, set_row) = create_signal(DeleteRow::new(id));

    let on_delete_click = move |_| {
        let accepted = web_sys::window()
            .map(|w| w.confirm_with_message(CONFIRM_DELETE).unwrap_or(false))
            .unwrap_or(false);
        if !set_row.try_update(|r| r.confirm(accepted)).unwrap_or(false) {
            return;
        }
        set_row.update(|r| r.begin());
        spawn_local(async move {
            let outcome = send_delete(id).await;
            match set_row.try_update(|r| r.finish(outcome)) {
                Some(DeleteVerdict::Removed) => on_refresh(),
                Some(DeleteVerdict::Failed(msg)) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&msg);
                    }
                }
                None => {}
            }
        });
    };

    view! {
        <div class="file-row">
            <div class="file-name">{entry.name.clone()}</div>
            <div class="file-size">{format_size(entry.size_bytes)}</div>
            <button
                type="button"
                class="action-btn delete-btn border-container"
                disabled=move || !row.get().control_enabled()
                on:click=on_delete_click
            >
                {move || row.get().control_label()}
            </button>
        </div>
    }
}

#[component]
fn UploadModal<F, G>(on_close: F, on_refresh: G) -> impl IntoView
where
    F: Fn() + Copy + 'static,
    G: Fn() + Copy + 'static,
{
    let (selection, set_selection) = create_signal(Selection::<File>::new());
    let (session, set_session) = create_signal(UploadSession::new());
    let (status, set_status) = create_signal(String::new());
    let (expiry, set_expiry) = create_signal("7".to_string());
    let (drop_hover, set_drop_hover) = create_signal(false);
    let file_input_ref = create_node_ref::<leptos::html::Input>();

    // every picker or drop event replaces the candidate set
    let apply_selection = move |picked: Vec<File>| {
        set_selection.update(|sel| sel.set_selection(picked));
        set_status.set(selection.with_untracked(|sel| sel.status_line()));
    };

    let on_file_change = move |_ev: Event| {
        if let Some(input) = file_input_ref.get_untracked() {
            if let Some(files) = input.files() {
                apply_selection(FileList::from(files).iter().cloned().collect());
            }
        }
    };

    let on_zone_click = move |_| {
        if let Some(input) = file_input_ref.get_untracked() {
            input.click();
        }
    };

    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        set_drop_hover.set(true);
    };

    let on_drag_leave = move |_ev: DragEvent| set_drop_hover.set(false);

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_drop_hover.set(false);
        if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
            apply_selection(FileList::from(files).iter().cloned().collect());
        }
    };

    let on_upload_click = move |_| {
        let files = selection.with_untracked(|sel| sel.files().to_vec());
        let begun = set_session
            .try_update(|s| s.begin(files.len()))
            .unwrap_or_else(|| Err("Upload already in progress.".to_string()));
        if let Err(msg) = begun {
            set_status.set(msg);
            return;
        }
        set_status.set(session.with_untracked(|s| s.status_line()));
        let expiry_value = expiry.get_untracked();
        spawn_local(async move {
            let outcome = send_upload(files, expiry_value, move |sent, total| {
                set_session.update(|s| s.progress(sent, total));
                set_status.set(session.with_untracked(|s| s.status_line()));
            })
            .await;
            let refresh_due = set_session.try_update(|s| s.finish(outcome)).unwrap_or(false);
            set_status.set(session.with_untracked(|s| s.status_line()));
            if refresh_due {
                TimeoutFuture::new(UPLOAD_REFRESH_DELAY_MS).await;
                on_refresh();
            }
        });
    };

    view! {
        <div class="modal-backdrop">
            <div class="modal upload-modal border-container">
                <div
                    class=move || if drop_hover.get() { "drop-zone hover" } else { "drop-zone" }
                    on:click=on_zone_click
                    on:dragover=on_drag_over
                    on:dragleave=on_drag_leave
                    on:drop=on_drop
                >
                    "drop files here or click to choose"
                </div>
                <input
                    type="file"
                    multiple
                    ref=file_input_ref
                    on:change=on_file_change
                    style="display: none;"
                />

                <div class="form-field">
                    <label class="field-label">"keep for"</label>
                    <select
                        class="unit-select border-container"
                        on:change=move |ev| set_expiry.set(event_target_value(&ev))
                    >
                        {EXPIRY_CHOICES
                            .iter()
                            .map(|(value, label)| {
                                let value = *value;
                                let preselected = value == "7";
                                view! {
                                    <option value=value selected=preselected>{*label}</option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>

                <div class="status-line">{move || status.get()}</div>

                <div class="modal-actions">
                    <button
                        type="button"
                        class="action-btn border-container"
                        disabled=move || session.get().in_flight()
                        on:click=on_upload_click
                    >
                        "upload"
                    </button>
                    <button
                        type="button"
                        class="action-btn border-container"
                        on:click=move |_| on_close()
                    >
                        "close"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn SettingsModal<F, G>(on_close: F, on_refresh: G) -> impl IntoView
where
    F: Fn() + Copy + 'static,
    G: Fn() + Copy + 'static,
{
    let (form, set_form) = create_signal(SettingsForm::new());

    set_form.update(|f| f.begin_load());
    spawn_local(async move {
        let outcome = fetch_settings().await;
        set_form.update(|f| f.finish_load(outcome));
    });

    let on_save_click = move |_| {
        set_form.update(|f| f.begin_save());
        let snapshot = form.get_untracked();
        spawn_local(async move {
            let outcome = submit_settings(&snapshot).await;
            let refresh_due = set_form.try_update(|f| f.finish_save(outcome)).unwrap_or(false);
            if refresh_due {
                TimeoutFuture::new(SETTINGS_REFRESH_DELAY_MS).await;
                on_refresh();
            }
        });
    };

    view! {
        <div class="modal-backdrop">
            <div class="modal settings-modal border-container">
                <div class="form-field">
                    <label class="field-label">"storage quota"</label>
                    <input
                        type="text"
                        class="size-input border-container"
                        prop:value=move || form.get().quota_value
                        on:input=move |ev| {
                            set_form.update(|f| f.quota_value = event_target_value(&ev))
                        }
                    />
                    <select
                        class="unit-select border-container"
                        prop:value=move || form.get().quota_unit.as_str()
                        on:change=move |ev| {
                            set_form.update(|f| {
                                if let Some(unit) = SizeUnit::parse(&event_target_value(&ev)) {
                                    f.quota_unit = unit;
                                }
                            })
                        }
                    >
                        <option value="mb">"MB"</option>
                        <option value="gb">"GB"</option>
                    </select>
                </div>

                <div class="form-field">
                    <label class="field-label">"max file size"</label>
                    <input
                        type="text"
                        class="size-input border-container"
                        prop:value=move || form.get().file_value
                        on:input=move |ev| {
                            set_form.update(|f| f.file_value = event_target_value(&ev))
                        }
                    />
                    <select
                        class="unit-select border-container"
                        prop:value=move || form.get().file_unit.as_str()
                        on:change=move |ev| {
                            set_form.update(|f| {
                                if let Some(unit) = SizeUnit::parse(&event_target_value(&ev)) {
                                    f.file_unit = unit;
                                }
                            })
                        }
                    >
                        <option value="mb">"MB"</option>
                        <option value="gb">"GB"</option>
                    </select>
                </div>

                <div class="status-line">{move || form.get().status_line()}</div>

                <div class="modal-actions">
                    <button type="button" class="action-btn border-container" on:click=on_save_click>
                        "save"
                    </button>
                    <button
                        type="button"
                        class="action-btn border-container"
                        on:click=move |_| on_close()
                    >
                        "close"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// Sends the multipart upload through `XmlHttpRequest`, which is the only
/// browser transport that reports upload progress. `on_progress` receives
/// (bytes_sent, bytes_total) for every event where the length is computable.
async fn send_upload(
    files: Vec<File>,
    expiry: String,
    mut on_progress: impl FnMut(u64, u64) + 'static,
) -> HttpOutcome<UploadReply> {
    let form = match FormData::new() {
        Ok(form) => form,
        Err(e) => {
            log::error!("failed to create form data: {e:?}");
            return HttpOutcome::NetworkError;
        }
    };
    for file in &files {
        if form.append_with_blob("files", file.as_ref()).is_err() {
            log::error!("failed to append file to form data");
            return HttpOutcome::NetworkError;
        }
    }
    if form.append_with_str("expiry", &expiry).is_err() {
        return HttpOutcome::NetworkError;
    }

    let xhr = match XmlHttpRequest::new() {
        Ok(xhr) => xhr,
        Err(e) => {
            log::error!("failed to create request: {e:?}");
            return HttpOutcome::NetworkError;
        }
    };
    if xhr.open("POST", "/upload").is_err() {
        return HttpOutcome::NetworkError;
    }

    let (tx, rx) = futures::channel::oneshot::channel::<Option<(u16, Option<String>)>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let onload = {
        let xhr = xhr.clone();
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let status = xhr.status().unwrap_or(0);
                let text = xhr.response_text().ok().flatten();
                let _ = tx.send(Some((status, text)));
            }
        })
    };
    xhr.set_onload(Some(onload.as_ref().unchecked_ref()));

    let onerror = {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(None);
            }
        })
    };
    xhr.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    let onprogress = Closure::<dyn FnMut(ProgressEvent)>::new(move |ev: ProgressEvent| {
        if ev.length_computable() {
            on_progress(ev.loaded() as u64, ev.total() as u64);
        }
    });
    if let Ok(upload) = xhr.upload() {
        upload.set_onprogress(Some(onprogress.as_ref().unchecked_ref()));
    }

    if xhr.send_with_opt_form_data(Some(&form)).is_err() {
        return HttpOutcome::NetworkError;
    }

    // the closures must stay alive until the request settles
    match rx.await {
        Ok(Some((status, text))) => {
            let body = text.and_then(|t| serde_json::from_str::<UploadReply>(&t).ok());
            HttpOutcome::Response { status, body }
        }
        _ => HttpOutcome::NetworkError,
    }
}

async fn fetch_settings() -> HttpOutcome<StorageSettings> {
    match Request::get("/settings/storage").send().await {
        Ok(response) => {
            let status = response.status();
            let body = response.json::<StorageSettings>().await.ok();
            HttpOutcome::Response { status, body }
        }
        Err(e) => {
            log::error!("settings load failed: {e:?}");
            HttpOutcome::NetworkError
        }
    }
}

async fn submit_settings(form: &SettingsForm) -> HttpOutcome<ActionReply> {
    let data = match FormData::new() {
        Ok(data) => data,
        Err(e) => {
            log::error!("failed to create form data: {e:?}");
            return HttpOutcome::NetworkError;
        }
    };
    let fields = [
        ("quota_size", form.quota_value.as_str()),
        ("quota_unit", form.quota_unit.as_str()),
        ("file_size", form.file_value.as_str()),
        ("file_unit", form.file_unit.as_str()),
    ];
    for (name, value) in fields {
        if data.append_with_str(name, value).is_err() {
            return HttpOutcome::NetworkError;
        }
    }

    let request = match Request::post("/settings/storage").body(data) {
        Ok(request) => request,
        Err(e) => {
            log::error!("failed to build settings request: {e:?}");
            return HttpOutcome::NetworkError;
        }
    };
    match request.send().await {
        Ok(response) => {
            let status = response.status();
            let body = response.json::<ActionReply>().await.ok();
            HttpOutcome::Response { status, body }
        }
        Err(e) => {
            log::error!("settings save failed: {e:?}");
            HttpOutcome::NetworkError
        }
    }
}

async fn send_delete(id: u64) -> HttpOutcome<ActionReply> {
    match Request::post(&format!("/files/{id}/delete")).send().await {
        Ok(response) => {
            let status = response.status();
            let body = response.json::<ActionReply>().await.ok();
            HttpOutcome::Response { status, body }
        }
        Err(e) => {
            log::error!("delete failed: {e:?}");
            HttpOutcome::NetworkError
        }
    }
}

/// The hosting page embeds the server-rendered listing as JSON in a
/// `<script id="initial-state">` element.
fn read_initial_files() -> Vec<FileEntry> {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("initial-state"))
        .and_then(|el| el.text_content());
    match text {
        Some(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            log::error!("bad initial state: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    }
}

fn reload_view() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().reload() {
            log::error!("reload failed: {e:?}");
        }
    }
}

fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[wasm_bindgen]
pub fn run() {
    console_error_panic_hook::set_once();
    mount_to_body(|| view! { <App /> });
}

// CSS-in-Rust: Catppuccin Mocha with labelled border containers
const MAIN_STYLES: &str = r#"
@import url("https://fonts.googleapis.com/css2?family=DM+Mono:ital,wght@0,300;0,400;0,500&display=swap");

body {
    font-family: "DM Mono", monospace;
    letter-spacing: -0.05ch;
    background-color: #1e1e2e;
    color: #cdd6f4;
    margin: 0;
    padding: 20px;
}

.app {
    max-width: 900px;
    margin: 0 auto;
}

.border-container {
    position: relative;
    padding: 20px;
    border: 2px solid #45475a;
    transition: border-color 0.2s ease-out;
    background-color: #1e1e2e;
}

.border-container::before {
    position: absolute;
    top: -12px;
    left: 20px;
    background-color: #1e1e2e;
    padding: 0 8px;
    font-size: 14px;
    color: #45475a;
    transition: color 0.2s ease-out;
}

.header-section {
    margin-bottom: 20px;
}
.header-section::before {
    content: "file hosting";
}
.header-section:hover {
    border-color: #cba6f7;
}
.header-section:hover::before {
    color: #cba6f7;
}

.header-row {
    display: flex;
    justify-content: space-between;
    align-items: center;
}

.header-row h1 {
    margin: 0;
    font-size: 2rem;
    font-weight: 500;
}

.header-row p {
    color: #bac2de;
    margin: 8px 0 0 0;
}

.header-actions {
    display: flex;
    gap: 10px;
}

.files-section::before {
    content: "files";
}
.files-section:hover {
    border-color: #f38ba8;
}
.files-section:hover::before {
    color: #f38ba8;
}

.file-row {
    display: flex;
    align-items: center;
    gap: 15px;
    padding: 10px 0;
    border-bottom: 1px solid #313244;
}

.file-name {
    flex: 1;
    word-break: break-word;
}

.file-size {
    color: #a6adc8;
    font-size: 14px;
}

.empty-list {
    text-align: center;
    padding: 40px 20px;
    color: #bac2de;
}

.empty-hint {
    color: #6c7086;
    font-size: 14px;
    margin-top: 5px;
}

.open-btn, .action-btn {
    background-color: #1e1e2e;
    border: 2px solid #45475a;
    color: #cdd6f4;
    padding: 10px 16px;
    cursor: pointer;
    font-family: "DM Mono", monospace;
    font-size: 14px;
    transition: border-color 0.2s ease-out;
}

.open-btn:hover, .action-btn:hover:not(:disabled) {
    border-color: #89b4fa;
}

.action-btn:disabled {
    border-color: #313244;
    color: #6c7086;
    cursor: not-allowed;
}

.delete-btn:hover:not(:disabled) {
    border-color: #f38ba8;
}

.modal-backdrop {
    position: fixed;
    inset: 0;
    background-color: rgba(17, 17, 27, 0.8);
    display: flex;
    justify-content: center;
    align-items: center;
}

.modal {
    width: min(480px, 90vw);
}

.upload-modal::before {
    content: "upload files";
}

.settings-modal::before {
    content: "storage settings";
}

.drop-zone {
    border: 2px dashed #45475a;
    padding: 40px 20px;
    text-align: center;
    color: #bac2de;
    cursor: pointer;
    margin-bottom: 15px;
    transition: border-color 0.2s ease-out;
}

.drop-zone.hover {
    border-color: #a6e3a1;
    color: #a6e3a1;
}

.form-field {
    display: flex;
    align-items: center;
    gap: 10px;
    margin-bottom: 15px;
}

.field-label {
    color: #bac2de;
    font-size: 14px;
    min-width: 110px;
}

.size-input {
    background-color: #1e1e2e;
    border: 2px solid #45475a;
    color: #cdd6f4;
    padding: 8px 12px;
    font-family: "DM Mono", monospace;
    font-size: 14px;
    width: 100px;
}

.size-input:focus {
    outline: none;
    border-color: #fab387;
}

.unit-select {
    background-color: #1e1e2e;
    border: 2px solid #45475a;
    color: #cdd6f4;
    padding: 8px 12px;
    font-family: "DM Mono", monospace;
    font-size: 14px;
}

.status-line {
    min-height: 20px;
    color: #a6adc8;
    font-size: 14px;
    margin-bottom: 15px;
}

.modal-actions {
    display: flex;
    gap: 10px;
    justify-content: flex-end;
}
"#;

// CSS-in-Rust: Component that injects styles
#[component]
fn StyleProvider() -> impl IntoView {
    view! {
        <style>{MAIN_STYLES}</style>
    }
}
