/// Render the review page. Everything dynamic is loaded from `/api`.
pub fn render_page(title: &str) -> String {
    PAGE_TEMPLATE.replace("{{TITLE}}", &escape_html(title))
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{TITLE}}</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 1100px; padding: 0 1rem; color: #262730; }
  h1 { font-size: 2rem; margin-bottom: 1.5rem; }
  label { display: block; font-size: 0.9rem; margin-bottom: 0.3rem; }
  label.hidden { visibility: hidden; }
  label.collapsed { display: none; }
  #name { width: 100%; box-sizing: border-box; padding: 0.5rem; font-size: 1rem; margin-bottom: 1rem; }
  #grid-wrap { overflow: auto; border: 1px solid #ddd; border-radius: 4px; }
  #grid-wrap.full { width: 100%; }
  table { border-collapse: collapse; width: 100%; }
  th, td { border-bottom: 1px solid #eee; padding: 0.25rem 0.5rem; text-align: left; white-space: nowrap; }
  th { position: sticky; top: 0; background: #f7f7f9; }
  td input, td select { width: 100%; box-sizing: border-box; border: none; background: transparent; font: inherit; }
  td.readonly { color: #555; }
  td.rejected { background: #fde8e8; }
  button { margin-top: 1rem; padding: 0.5rem 1.2rem; font-size: 1rem; }
  #message { margin-top: 1rem; }
  #message.error { color: #d33; }
  #message.success { color: #262730; }
</style>
</head>
<body>
<h1>{{TITLE}}</h1>
<label id="name-label" for="name"></label>
<input id="name" type="text" autocomplete="off">
<div id="grid-wrap"><table id="grid"><thead></thead><tbody></tbody></table></div>
<button id="submit" type="button">Submit</button>
<p id="message"></p>
<script>
(function () {
  const STORAGE_KEY = 'rfm-review-session';
  let view = null;

  async function api(method, path, body) {
    const response = await fetch('/api' + path, {
      method,
      headers: body ? { 'Content-Type': 'application/json' } : {},
      body: body ? JSON.stringify(body) : undefined,
    });
    const data = await response.json().catch(() => ({}));
    if (!response.ok) {
      const err = new Error(data.message || response.statusText);
      err.status = response.status;
      throw err;
    }
    return data;
  }

  async function openSession() {
    const existing = sessionStorage.getItem(STORAGE_KEY);
    if (existing) {
      try {
        return await api('GET', '/sessions/' + existing);
      } catch (err) {
        if (err.status !== 404) throw err;
      }
    }
    const created = await api('POST', '/sessions');
    sessionStorage.setItem(STORAGE_KEY, created.id);
    return created;
  }

  function showMessage(message) {
    const el = document.getElementById('message');
    el.textContent = message ? message.text : '';
    el.className = message ? message.level : '';
  }

  function renderInput() {
    const label = document.getElementById('name-label');
    const input = document.getElementById('name');
    label.textContent = view.nameLabel;
    label.className = view.nameInput.visibility;
    input.disabled = view.nameInput.disabled;
    if (document.activeElement !== input) input.value = view.reviewerName;
  }

  function renderCell(td, column, rowIndex, value) {
    td.innerHTML = '';
    td.className = column.editable ? '' : 'readonly';
    if (!column.editable) {
      td.textContent = value;
      return;
    }
    let control;
    if (column.options) {
      control = document.createElement('select');
      const blank = document.createElement('option');
      blank.value = '';
      blank.textContent = '';
      control.appendChild(blank);
      for (const option of column.options) {
        const el = document.createElement('option');
        el.value = option.value;
        el.textContent = option.label;
        if (option.label === value) el.selected = true;
        control.appendChild(el);
      }
      if (column.help) td.title = column.help;
    } else {
      control = document.createElement('input');
      control.type = 'text';
      control.value = value;
    }
    control.addEventListener('change', () => editCell(td, column, rowIndex, control.value));
    td.appendChild(control);
  }

  function renderGrid() {
    const wrap = document.getElementById('grid-wrap');
    wrap.className = view.editor.fullWidth ? 'full' : '';
    wrap.style.height = view.editor.heightPx + 'px';

    const head = document.querySelector('#grid thead');
    const body = document.querySelector('#grid tbody');
    head.innerHTML = '';
    body.innerHTML = '';

    const headRow = document.createElement('tr');
    if (!view.editor.hideIndex) headRow.appendChild(document.createElement('th'));
    for (const column of view.columns) {
      const th = document.createElement('th');
      th.textContent = column.label;
      if (column.help) th.title = column.help;
      headRow.appendChild(th);
    }
    head.appendChild(headRow);

    view.rows.forEach((row, rowIndex) => {
      const tr = document.createElement('tr');
      if (!view.editor.hideIndex) {
        const th = document.createElement('th');
        th.textContent = row.index;
        tr.appendChild(th);
      }
      view.columns.forEach((column, colIndex) => {
        const td = document.createElement('td');
        renderCell(td, column, rowIndex, row.cells[colIndex]);
        tr.appendChild(td);
      });
      body.appendChild(tr);
    });
  }

  async function editCell(td, column, rowIndex, value) {
    try {
      view = await api('PATCH', '/sessions/' + view.id + '/cells', {
        row: rowIndex,
        column: column.name,
        value,
      });
    } catch (err) {
      td.classList.add('rejected');
      showMessage({ level: 'error', text: err.message });
    }
    const colIndex = view.columns.findIndex((c) => c.name === column.name);
    renderCell(td, column, rowIndex, view.rows[rowIndex].cells[colIndex]);
  }

  async function saveName() {
    const input = document.getElementById('name');
    view = await api('PUT', '/sessions/' + view.id + '/reviewer', { name: input.value });
  }

  async function submit() {
    try {
      await saveName();
      const result = await api('POST', '/sessions/' + view.id + '/submit');
      view = result.session;
      showMessage({ level: 'success', text: result.message });
    } catch (err) {
      showMessage({ level: 'error', text: err.message });
    }
  }

  async function start() {
    view = await openSession();
    renderInput();
    renderGrid();
    showMessage(view.message);
    document.getElementById('name').addEventListener('change', () => saveName().catch((err) => {
      showMessage({ level: 'error', text: err.message });
    }));
    document.getElementById('submit').addEventListener('click', submit);
  }

  start().catch((err) => showMessage({ level: 'error', text: err.message }));
})();
</script>
</body>
</html>
"#;
