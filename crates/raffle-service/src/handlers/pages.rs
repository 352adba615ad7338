//! Server-rendered public and admin pages.
//!
//! The public page is rendered from the current snapshot so it works before
//! any script runs; the inline script then keeps it fresh from the change
//! feed. The admin page carries no data until the PIN has been exchanged for
//! a session.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use raffle_core::{format_brl, EntryStatus, PaymentInfo, RaffleEntry, SlotNumber, TICKET_PRICE_CENTS};

use crate::error::ApiError;
use crate::state::AppState;

const STYLE: &str = r"
body{font-family:system-ui,sans-serif;background:#f3f4f6;margin:0;padding:24px}
.card{background:#fff;border-radius:8px;padding:16px;margin-bottom:16px;box-shadow:0 1px 2px #0002;max-width:640px}
.grid{display:grid;grid-template-columns:repeat(10,1fr);gap:8px;max-width:640px;margin-bottom:16px}
.slot{padding:8px;border:1px solid #ccc;border-radius:4px;font-weight:bold;background:#fff;cursor:pointer}
.slot.selected{background:#22c55e;color:#fff}
.slot.reserved{background:#9ca3af;color:#4b5563;cursor:not-allowed}
.slot.paid{background:#fef08a;cursor:not-allowed}
input{display:block;width:100%;padding:8px;margin-top:8px;box-sizing:border-box}
button.primary{margin-top:12px;width:100%;padding:8px;background:#000;color:#fff;border:0;border-radius:4px}
button:disabled{opacity:.4}
.entry{border:1px solid #ddd;border-radius:8px;padding:8px 12px;margin-top:8px}
.status-paid{color:#15803d;font-weight:600}.status-reserved{color:#a16207;font-weight:600}
";

const PUBLIC_SCRIPT: &str = r##"
const price = Number(document.body.dataset.price);
const selected = new Set();
let entries = [];
const fmt = c => "R$ " + (c / 100).toFixed(2).replace(".", ",");
function refreshSummary() {
  const list = [...selected].sort((a, b) => a - b);
  document.getElementById("selected").textContent = list.length ? list.join(", ") : "-";
  document.getElementById("total").textContent = fmt(list.length * price);
}
function render() {
  const taken = new Map(entries.map(e => [e.slot, e.status]));
  document.querySelectorAll(".slot").forEach(b => {
    const n = Number(b.dataset.slot), status = taken.get(n);
    if (status) selected.delete(n);
    b.disabled = !!status;
    b.className = "slot " + (status || (selected.has(n) ? "selected" : "available"));
  });
  refreshSummary();
}
async function load() {
  try {
    const res = await fetch("/api/raffle");
    if (!res.ok) { console.error("Load error:", res.statusText); return; }
    entries = await res.json();
    render();
  } catch (err) { console.error("Load exception:", err); }
}
document.querySelectorAll(".slot").forEach(b => b.addEventListener("click", () => {
  const n = Number(b.dataset.slot);
  selected.has(n) ? selected.delete(n) : selected.add(n);
  render();
}));
document.getElementById("reserve").addEventListener("click", async () => {
  const first = document.getElementById("first").value.trim();
  const last = document.getElementById("last").value.trim();
  const phone = document.getElementById("phone").value.trim();
  if (!selected.size || !first || !last || !phone) {
    alert("Por favor, preencha nome, sobrenome e telefone"); return;
  }
  const name = first + " " + last;
  if (entries.some(e => e.buyer_name.toLowerCase() === name.toLowerCase())) {
    alert("Já existe uma reserva com este nome. Por favor, use um nome diferente ou adicione um apelido."); return;
  }
  const res = await fetch("/api/raffle/batch", {
    method: "POST", headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ slots: [...selected], buyer_name: name, phone })
  });
  const data = await res.json().catch(() => ({}));
  if (!res.ok) { alert("Erro ao reservar: " + (data.error || res.statusText)); return; }
  selected.clear();
  ["first", "last", "phone"].forEach(id => document.getElementById(id).value = "");
  load();
});
new EventSource("/api/raffle/changes").addEventListener("raffle", load);
load();
"##;

const ADMIN_SCRIPT: &str = r##"
let token = sessionStorage.getItem("raffle-admin");
const expiresAt = Date.parse(sessionStorage.getItem("raffle-admin-expires") || "");
if (token && !(expiresAt > Date.now())) {
  sessionStorage.removeItem("raffle-admin");
  sessionStorage.removeItem("raffle-admin-expires");
  token = null;
}
let busy = false;
let feed = null;
async function call(path, body) {
  if (busy) return false;
  busy = true;
  document.querySelectorAll("#controls button").forEach(b => b.disabled = true);
  try {
    const res = await fetch(path, {
      method: "POST",
      headers: { "Content-Type": "application/json", "Authorization": "Bearer " + token },
      body: JSON.stringify(body)
    });
    const json = await res.json().catch(() => ({}));
    if (res.status === 401 && !body.pin) { lock(); alert("Sessão expirada, digite o PIN novamente"); return false; }
    if (!res.ok) { alert(json.error || "Erro ao executar ação"); return false; }
    return true;
  } finally {
    busy = false;
    document.querySelectorAll("#controls button").forEach(b => b.disabled = false);
  }
}
function entryHtml(e) {
  const div = document.createElement("div");
  div.className = "entry";
  const paid = e.status === "paid";
  div.innerHTML = `<div><b>Nº ${e.slot} — <span class="name"></span></b></div>
    <div>Tel: <span class="phone"></span></div>
    <div>Status: <span class="${paid ? "status-paid" : "status-reserved"}">${paid ? "Pix confirmado" : "Aguardando Pix"}</span></div>`;
  div.querySelector(".name").textContent = e.buyer_name;
  div.querySelector(".phone").textContent = e.phone;
  if (!paid) {
    const c = document.createElement("button");
    c.textContent = "Confirmar Pix";
    c.onclick = async () => { if (await call("/api/admin/confirm", { slot: e.slot })) load(); };
    div.appendChild(c);
  }
  const u = document.createElement("button");
  u.textContent = "Liberar número";
  u.onclick = async () => { if (await call("/api/admin/unreserve", { slot: e.slot })) load(); };
  div.appendChild(u);
  return div;
}
async function load() {
  const res = await fetch("/api/raffle");
  if (!res.ok) return;
  const entries = await res.json();
  const list = document.getElementById("entries");
  list.replaceChildren(...entries.map(entryHtml));
  document.getElementById("empty").hidden = entries.length > 0;
}
function lock() {
  token = null;
  sessionStorage.removeItem("raffle-admin");
  sessionStorage.removeItem("raffle-admin-expires");
  document.getElementById("controls").hidden = true;
  document.getElementById("locked").hidden = false;
}
function unlock() {
  document.getElementById("locked").hidden = true;
  document.getElementById("controls").hidden = false;
  load();
  if (!feed) {
    feed = new EventSource("/api/raffle/changes");
    feed.addEventListener("raffle", () => { if (token) load(); });
  }
}
document.getElementById("login").addEventListener("click", async () => {
  const pin = document.getElementById("pin").value;
  if (pin.length < 3) { alert("PIN inválido"); return; }
  const res = await fetch("/api/admin/session", {
    method: "POST", headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ pin })
  });
  const json = await res.json().catch(() => ({}));
  if (!res.ok) { alert(json.error || "PIN inválido"); return; }
  token = json.token;
  sessionStorage.setItem("raffle-admin", token);
  sessionStorage.setItem("raffle-admin-expires", json.expires_at);
  unlock();
});
document.getElementById("reset").addEventListener("click", async () => {
  if (!confirm("Tem certeza que quer zerar toda a rifa?")) return;
  if (await call("/api/admin/reset", {})) load();
});
if (token) unlock();
"##;

/// Public page: slot grid, payment instructions and reservation form.
pub async fn public_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let entries = state.store.list_entries().await?;
    Ok(Html(render_public_page(&entries, &state.config.payment)))
}

/// Admin page shell.
pub async fn admin_page() -> Html<String> {
    Html(render_admin_page())
}

/// Render the public page for a snapshot of entries.
#[must_use]
pub fn render_public_page(entries: &[RaffleEntry], payment: &PaymentInfo) -> String {
    let grid: String = SlotNumber::all()
        .map(|slot| {
            let status = entries.iter().find(|e| e.slot == slot).map(|e| e.status);
            let (class, disabled) = match status {
                None => ("available", ""),
                Some(EntryStatus::Reserved) => ("reserved", " disabled"),
                Some(EntryStatus::Paid) => ("paid", " disabled"),
            };
            format!(r#"<button class="slot {class}" data-slot="{slot}"{disabled}>{slot}</button>"#)
        })
        .collect();

    let payment_box = format!(
        "<p><b>Dados para PIX:</b></p><p>Chave PIX: <b>{}</b></p><p>Titular: <b>{}</b></p><p>Banco: <b>{}</b></p>",
        escape_html(&payment.pix_key),
        escape_html(&payment.pix_holder),
        escape_html(&payment.pix_bank),
    );

    format!(
        r#"<!doctype html>
<html lang="pt-BR"><head><meta charset="utf-8"><title>Rifa Solidária</title>
<meta name="viewport" content="width=device-width,initial-scale=1"><style>{STYLE}</style></head>
<body data-price="{TICKET_PRICE_CENTS}">
<h1>🎟️ Rifa Solidária</h1>
<div class="card">{payment_box}</div>
<div class="grid">{grid}</div>
<div class="card">
<p>Números selecionados: <b id="selected">-</b></p>
<p>Total de PIX: <b id="total">{zero}</b></p>
<p><b>Dados para confirmar:</b></p>
<input id="first" placeholder="Nome"><input id="last" placeholder="Sobrenome"><input id="phone" placeholder="Telefone">
<button id="reserve" class="primary">✓ Confirmar Reserva</button>
</div>
<script>{PUBLIC_SCRIPT}</script>
</body></html>"#,
        zero = format_brl(0),
    )
}

/// Render the admin page shell.
#[must_use]
pub fn render_admin_page() -> String {
    format!(
        r#"<!doctype html>
<html lang="pt-BR"><head><meta charset="utf-8"><title>Admin — Rifa</title>
<meta name="viewport" content="width=device-width,initial-scale=1"><style>{STYLE}</style></head>
<body>
<div class="card">
<h1>Admin — Rifa</h1>
<p>Aqui você confirma Pix, libera números e pode zerar a rifa.</p>
<a href="/">← Voltar para rifa pública</a>
<label>PIN do admin<input id="pin" type="password" placeholder="PIN"></label>
<button id="login" class="primary">Entrar</button>
</div>
<div id="locked" class="card">Digite seu PIN e clique em <b>Entrar</b> para ver os controles da rifa.</div>
<div id="controls" class="card" hidden>
<h2>Números reservados</h2>
<button id="reset">Zerar tudo</button>
<p id="empty">Ainda não há nenhum número reservado.</p>
<div id="entries"></div>
</div>
<script>{ADMIN_SCRIPT}</script>
</body></html>"#
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use raffle_core::NewReservation;

    fn payment() -> PaymentInfo {
        PaymentInfo {
            pix_key: "123".into(),
            pix_holder: "Maria <Admin>".into(),
            pix_bank: "Banco".into(),
        }
    }

    #[test]
    fn renders_every_slot_with_state() {
        let slot = |n| SlotNumber::new(n).unwrap();
        let reserved = RaffleEntry::reserved(
            &NewReservation::new(slot(3), "Ana Silva", "119").unwrap(),
            Utc::now(),
        );
        let mut paid = RaffleEntry::reserved(
            &NewReservation::new(slot(4), "Bruno Costa", "119").unwrap(),
            Utc::now(),
        );
        paid.mark_paid(Utc::now());

        let html = render_public_page(&[reserved, paid], &payment());

        assert_eq!(html.matches(r#"class="slot "#).count(), 100);
        assert!(html.contains(r#"<button class="slot reserved" data-slot="3" disabled>3</button>"#));
        assert!(html.contains(r#"<button class="slot paid" data-slot="4" disabled>4</button>"#));
        assert!(html.contains(r#"<button class="slot available" data-slot="5">5</button>"#));
        assert!(html.contains("R$ 0,00"));
    }

    #[test]
    fn escapes_payment_text() {
        let html = render_public_page(&[], &payment());
        assert!(html.contains("Maria &lt;Admin&gt;"));
        assert!(!html.contains("Maria <Admin>"));
    }

    #[test]
    fn admin_shell_has_no_data() {
        let html = render_admin_page();
        assert!(html.contains(r#"id="pin""#));
        assert!(html.contains(r#"id="controls" class="card" hidden"#));
    }

    #[test]
    fn admin_script_drops_expired_sessions() {
        let html = render_admin_page();
        assert!(html.contains(r#"sessionStorage.setItem("raffle-admin-expires", json.expires_at)"#));
        assert!(html.contains("!(expiresAt > Date.now())"));
    }
}
