use crate::bridge;
use crate::dto::{DashboardDto, IntegrationDto, ReportDto, WorkflowDto, WorkflowStepDto};
use chaos_contracts::{
    validate_suggest_input, FieldViolation, SuggestExperimentsInput, SuggestExperimentsOutput,
    ToastDto,
};
use leptos::*;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

const STATUS_POLL: Duration = Duration::from_secs(1);

const EXPERIMENTS: [(&str, &str, &str); 3] = [
    (
        "pod_crash",
        "Pod Crash Test - Web Server",
        "Terminate a random pod in a target deployment to test self-healing.",
    ),
    (
        "latency",
        "API Gateway Latency Injection",
        "Introduce network delay to test service resilience to slow dependencies.",
    ),
    (
        "resource",
        "Inventory Service CPU Exhaustion",
        "Simulate high CPU or memory usage to test scaling and performance.",
    ),
];

fn score_class(score: f64) -> &'static str {
    if score > 8.5 {
        "ok"
    } else if score > 7.0 {
        "mid"
    } else {
        "warn"
    }
}

fn status_class(status: &str) -> &'static str {
    match status {
        "Completed" => "ok",
        "Action Required" => "warn",
        _ => "pending",
    }
}

/// Id of the step `offset` places away from `id`, if there is one.
fn neighbor(steps: &[WorkflowStepDto], id: &str, offset: isize) -> Option<String> {
    let at = steps.iter().position(|s| s.id == id)?;
    let target = at.checked_add_signed(offset)?;
    steps.get(target).map(|s| s.id.clone())
}

fn violation_for(violations: &[FieldViolation], field: &str) -> Option<String> {
    violations
        .iter()
        .find(|v| v.field == field)
        .map(|v| v.message.clone())
}

#[component]
pub fn App() -> impl IntoView {
    let reports = create_rw_signal(Vec::<ReportDto>::new());
    let dashboard = create_rw_signal(DashboardDto::default());
    let running = create_rw_signal(None::<String>);
    let toast = create_rw_signal(None::<ToastDto>);

    let historical = create_rw_signal(String::new());
    let behavior = create_rw_signal(String::new());
    let violations = create_rw_signal(Vec::<FieldViolation>::new());
    let suggestion = create_rw_signal(None::<SuggestExperimentsOutput>);
    let suggesting = create_rw_signal(false);

    let workflow = create_rw_signal(WorkflowDto::default());
    let integrations = create_rw_signal(Vec::<IntegrationDto>::new());

    let load = move || {
        spawn_local(async move {
            match bridge::fetch_reports().await {
                Ok(list) => reports.set(list),
                Err(t) => toast.set(Some(t)),
            }
            match bridge::fetch_dashboard().await {
                Ok(d) => dashboard.set(d),
                Err(t) => toast.set(Some(t)),
            }
        });
    };

    fn poll_status(running: RwSignal<Option<String>>, on_done: impl Fn() + Clone + 'static) {
        spawn_local(async move {
            match bridge::fetch_status().await {
                Ok(status) if status.running => {
                    running.set(status.report_id);
                    let next = on_done.clone();
                    set_timeout(move || poll_status(running, next), STATUS_POLL);
                }
                _ => {
                    running.set(None);
                    on_done();
                }
            }
        });
    }

    let trigger = move |kind: &'static str, name: &'static str| {
        if running.get_untracked().is_some() {
            return;
        }
        spawn_local(async move {
            match bridge::trigger_experiment(kind, name).await {
                Ok(pending) => {
                    running.set(Some(pending.id));
                    load();
                    set_timeout(move || poll_status(running, load), STATUS_POLL);
                }
                Err(t) => toast.set(Some(t)),
            }
        });
    };

    let download = move |report: ReportDto| {
        if report.in_progress() {
            toast.set(Some(ToastDto::new(
                "Report Not Ready",
                "Please wait for the experiment to complete.",
            )));
            return;
        }
        spawn_local(async move {
            if let Err(t) = bridge::download_report(&report).await {
                toast.set(Some(t));
            }
        });
    };

    let submit = move || {
        let input = SuggestExperimentsInput {
            historical_data: historical.get_untracked(),
            system_behavior: behavior.get_untracked(),
        };
        if let Err(found) = validate_suggest_input(&input) {
            violations.set(found);
            return;
        }
        violations.set(Vec::new());
        suggestion.set(None);
        suggesting.set(true);
        spawn_local(async move {
            match bridge::suggest(&input).await {
                Ok(out) => suggestion.set(Some(out)),
                Err(t) => {
                    violations.set(t.violations.clone());
                    toast.set(Some(t));
                }
            }
            suggesting.set(false);
        });
    };

    let load_settings = move || {
        spawn_local(async move {
            match bridge::fetch_workflow().await {
                Ok(w) => workflow.set(w),
                Err(t) => toast.set(Some(t)),
            }
            match bridge::fetch_integrations().await {
                Ok(list) => integrations.set(list),
                Err(t) => toast.set(Some(t)),
            }
        });
    };

    let shift_step = move |id: String, offset: isize| {
        let Some(over) = neighbor(&workflow.get_untracked().steps, &id, offset) else {
            return;
        };
        spawn_local(async move {
            match bridge::move_step(&id, &over).await {
                Ok(w) => workflow.set(w),
                Err(t) => toast.set(Some(t)),
            }
        });
    };

    let save_workflow = move || {
        spawn_local(async move {
            match bridge::save_workflow().await {
                Ok(t) | Err(t) => toast.set(Some(t)),
            }
        });
    };

    let toggle = move |id: String| {
        spawn_local(async move {
            match bridge::toggle_integration(&id).await {
                Ok(outcome) => {
                    let updated = outcome.integration.clone();
                    integrations.update(|list| {
                        if let Some(slot) = list.iter_mut().find(|i| i.id == updated.id) {
                            *slot = updated;
                        }
                    });
                    toast.set(Some(ToastDto::new(outcome.title, outcome.description)));
                }
                Err(t) => toast.set(Some(t)),
            }
        });
    };

    load();
    load_settings();
    poll_status(running, load);

    let last_result = move || reports.get().into_iter().find(|r| !r.in_progress());

    view! {
      <div class="layout">
        <section class="panel">
          <h2>"Dashboard"</h2>
          <div class="row">
            <div class="stat"><b>{move || dashboard.get().total_reports}</b>" reports"</div>
            <div class="stat"><b>{move || dashboard.get().completed}</b>" completed"</div>
            <div class="stat warn"><b>{move || dashboard.get().action_required}</b>" action required"</div>
            <div class="stat"><b>{move || dashboard.get().in_progress}</b>" in progress"</div>
          </div>
          <div class="meta">
            {move || match dashboard.get().average_score {
                Some(avg) => format!("Average resilience score {avg:.1}"),
                None => "No finished experiments yet".to_string(),
            }}
          </div>
          <h3>"Score Trend"</h3>
          <ul class="trend">
            <For
              each=move || dashboard.get().score_trend.into_iter().enumerate()
              key=|(i, _)| *i
              children=move |(_, p)| view! {
                <li><span class="meta">{p.date}</span> " " <b class=score_class(p.score)>{format!("{:.1}", p.score)}</b></li>
              }
            />
          </ul>
          <h3>"Recent Activity"</h3>
          <ul>
            <For
              each=move || dashboard.get().recent
              key=|r| (r.id.clone(), r.status.clone())
              children=move |r| view! {
                <li>
                  <div><b>{r.name.clone()}</b></div>
                  <div class="meta">{format!("{} ({})", r.id, r.status)}</div>
                </li>
              }
            />
          </ul>
        </section>

        <section class="panel">
          <h2>"Experiments"</h2>
          <Show when=move || running.get().is_some() fallback=|| ()>
            <div class="meta">{move || format!("Running {}...", running.get().unwrap_or_default())}</div>
          </Show>
          <ul>
            {EXPERIMENTS
              .iter()
              .map(|&(kind, name, blurb)| view! {
                <li>
                  <div><b>{name}</b></div>
                  <div class="meta">{blurb}</div>
                  <button
                    prop:disabled=move || running.get().is_some()
                    on:click=move |_| trigger(kind, name)
                  >"Run Experiment"</button>
                </li>
              })
              .collect_view()}
          </ul>
          <h3>"Last Result"</h3>
          {move || last_result().map(|r| {
            let detail = r.result.clone();
            view! {
              <div class="card">
                <div><b>{r.name.clone()}</b> " " <span class=format!("badge {}", status_class(&r.status))>{r.status.clone()}</span></div>
                <div>{format!("Resilience score {:.1}", r.resilience_score)}</div>
                {detail.map(|d| view! {
                  <div class="meta">{format!("{} on {}", d.action, d.target)}</div>
                  <div>{d.outcome}</div>
                })}
              </div>
            }
          })}
        </section>

        <section class="panel">
          <h2>"Reports"</h2>
          <button on:click=move |_| load()>"Refresh"</button>
          <table>
            <tr><th>"Report"</th><th>"Date"</th><th>"Status"</th><th>"Score"</th><th></th></tr>
            <For
              each=move || reports.get()
              key=|r| (r.id.clone(), r.status.clone())
              children=move |r| {
                let score = if r.in_progress() {
                  "-".to_string()
                } else {
                  format!("{:.1}", r.resilience_score)
                };
                let row = r.clone();
                view! {
                  <tr>
                    <td><b>{r.name.clone()}</b><div class="meta">{r.id.clone()}</div></td>
                    <td class="meta">{r.date.clone()}</td>
                    <td><span class=format!("badge {}", status_class(&r.status))>{r.status.clone()}</span></td>
                    <td><b class=score_class(r.resilience_score)>{score}</b></td>
                    <td><button on:click=move |_| download(row.clone())>"Download"</button></td>
                  </tr>
                }
              }
            />
          </table>
        </section>

        <section class="panel">
          <h2>"Suggest Experiments"</h2>
          <div class="stack">
            <textarea
              prop:value=move || historical.get()
              on:input=move |ev| historical.set(event_target_value(&ev))
              placeholder="Historical data: past incidents, outages, error spikes"
            />
            {move || violation_for(&violations.get(), "historicalData").map(|m| view! { <div class="error">{m}</div> })}
            <textarea
              prop:value=move || behavior.get()
              on:input=move |ev| behavior.set(event_target_value(&ev))
              placeholder="System behavior: architecture, dependencies, scaling"
            />
            {move || violation_for(&violations.get(), "systemBehavior").map(|m| view! { <div class="error">{m}</div> })}
            <button prop:disabled=move || suggesting.get() on:click=move |_| submit()>
              {move || if suggesting.get() { "Generating..." } else { "Generate Suggestions" }}
            </button>
          </div>
          {move || suggestion.get().map(|s| view! {
            <h3>"Suggested Experiments"</h3>
            <ul>
              {s.experiments.into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
            </ul>
            <h3>"Rationale"</h3>
            <p>{s.rationale}</p>
          })}
        </section>

        <section class="panel">
          <h2>"Automated Workflows"</h2>
          <h3>{move || workflow.get().name}</h3>
          <div class="meta">"Reorder the steps to change the experiment sequence."</div>
          <ol>
            <For
              each=move || workflow.get().steps
              key=|s| s.id.clone()
              children=move |s| {
                let up = s.id.clone();
                let down = s.id.clone();
                view! {
                  <li class="step">
                    <span><span class=format!("badge {}", s.kind)>{s.kind.clone()}</span> " " {s.name.clone()}</span>
                    <span>
                      <button on:click=move |_| shift_step(up.clone(), -1)>"Up"</button>
                      <button on:click=move |_| shift_step(down.clone(), 1)>"Down"</button>
                    </span>
                  </li>
                }
              }
            />
          </ol>
          <button on:click=move |_| save_workflow()>"Save Workflow"</button>
        </section>

        <section class="panel">
          <h2>"Platform Integrations"</h2>
          <ul>
            <For
              each=move || integrations.get()
              key=|i| (i.id.clone(), i.connected)
              children=move |i| {
                let id = i.id.clone();
                view! {
                  <li class="card">
                    <div><b>{i.name.clone()}</b></div>
                    <div class="meta">{i.description.clone()}</div>
                    <button class:ok=i.connected on:click=move |_| toggle(id.clone())>
                      {if i.connected { "Connected" } else { "Connect" }}
                    </button>
                  </li>
                }
              }
            />
          </ul>
        </section>

        <Show when=move || toast.get().is_some() fallback=|| ()>
          <div class="toast" on:click=move |_| toast.set(None)>
            <b>{move || toast.get().map(|t| t.title).unwrap_or_default()}</b>
            <div>{move || toast.get().map(|t| t.description).unwrap_or_default()}</div>
          </div>
        </Show>
      </div>
    }
}
