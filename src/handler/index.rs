//! Index page module
//!
//! Serves the interactive UI: a PlantUML editor with layout controls that
//! posts to /convert and downloads the resulting .drawio file. The page is
//! embedded in the binary and identical for every request.

/// Get the index page HTML
#[allow(clippy::too_many_lines)]
pub fn get_index_page() -> String {
    String::from(
        r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>C4 PlantUML to draw.io</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            background: linear-gradient(135deg, #1168BD 0%, #08427B 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            color: white;
            padding: 24px;
        }
        .container {
            width: 100%;
            max-width: 760px;
            padding: 32px;
            background: rgba(255, 255, 255, 0.1);
            border-radius: 16px;
            backdrop-filter: blur(10px);
            border: 1px solid rgba(255, 255, 255, 0.18);
        }
        h1 {
            font-size: 1.8em;
            margin-bottom: 6px;
        }
        .subtitle {
            opacity: 0.85;
            margin-bottom: 20px;
        }
        textarea {
            width: 100%;
            height: 260px;
            padding: 12px;
            border-radius: 8px;
            border: none;
            font-family: "SF Mono", Consolas, Menlo, monospace;
            font-size: 13px;
            resize: vertical;
        }
        .controls {
            display: flex;
            flex-wrap: wrap;
            gap: 12px;
            margin: 16px 0;
            align-items: end;
        }
        .controls label {
            display: flex;
            flex-direction: column;
            font-size: 0.8em;
            gap: 4px;
        }
        .controls select, .controls input {
            padding: 6px 8px;
            border-radius: 6px;
            border: none;
            width: 90px;
        }
        button {
            padding: 10px 22px;
            border: none;
            border-radius: 8px;
            background: #4ade80;
            color: #0b3a1e;
            font-weight: 700;
            font-size: 1em;
            cursor: pointer;
        }
        button:hover {
            filter: brightness(1.1);
        }
        #error {
            display: none;
            margin-top: 14px;
            padding: 10px 14px;
            border-radius: 8px;
            background: rgba(180, 30, 30, 0.55);
            white-space: pre-wrap;
            font-family: "SF Mono", Consolas, Menlo, monospace;
            font-size: 0.85em;
        }
        .footer {
            margin-top: 18px;
            font-size: 0.85em;
            opacity: 0.7;
        }
        a {
            color: #4ade80;
            text-decoration: none;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>C4 PlantUML to draw.io</h1>
        <p class="subtitle">Paste a C4 diagram below and download it as an editable .drawio file.</p>
        <textarea id="source" spellcheck="false">@startuml
Person(user, "Customer")
System(shop, "Web Shop")
System_Ext(mail, "Mail Server")
Rel(user, shop, "Buys from")
Rel(shop, mail, "Sends receipts", "SMTP")
@enduml</textarea>
        <div class="controls">
            <label>Direction
                <select id="direction">
                    <option value="TB" selected>Top-Bottom</option>
                    <option value="BT">Bottom-Top</option>
                    <option value="LR">Left-Right</option>
                    <option value="RL">Right-Left</option>
                </select>
            </label>
            <label>Node sep.
                <input id="nodesep" type="number" value="60" min="0">
            </label>
            <label>Rank sep.
                <input id="ranksep" type="number" value="80" min="0">
            </label>
            <label>Margin X
                <input id="marginx" type="number" value="20" min="0">
            </label>
            <label>Margin Y
                <input id="marginy" type="number" value="20" min="0">
            </label>
            <button id="convert">Convert</button>
        </div>
        <div id="error"></div>
        <div class="footer">
            <p>Open the result at <a href="https://app.diagrams.net/" target="_blank">diagrams.net</a> &middot; <a href="/health">service health</a></p>
        </div>
    </div>
    <script>
        const errorBox = document.getElementById('error');

        document.getElementById('convert').addEventListener('click', async () => {
            errorBox.style.display = 'none';
            const params = new URLSearchParams({
                direction: document.getElementById('direction').value,
                nodesep: document.getElementById('nodesep').value,
                ranksep: document.getElementById('ranksep').value,
                marginx: document.getElementById('marginx').value,
                marginy: document.getElementById('marginy').value,
            });
            try {
                const res = await fetch('/convert?' + params.toString(), {
                    method: 'POST',
                    headers: { 'Content-Type': 'text/plain' },
                    body: document.getElementById('source').value,
                });
                if (!res.ok) {
                    errorBox.textContent = await res.text();
                    errorBox.style.display = 'block';
                    return;
                }
                const blob = await res.blob();
                const link = document.createElement('a');
                link.href = URL.createObjectURL(blob);
                link.download = 'diagram.drawio';
                link.click();
                URL.revokeObjectURL(link.href);
            } catch (err) {
                errorBox.textContent = 'Request failed: ' + err;
                errorBox.style.display = 'block';
            }
        });
    </script>
</body>
</html>"##,
    )
}
