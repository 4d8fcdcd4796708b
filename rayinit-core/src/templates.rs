//! Fixed file templates written into every new project.
//!
//! Lines containing [`PLACEHOLDER`] get the project name substituted; every
//! other line is written as-is.

pub const PLACEHOLDER: &str = "%s";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    /// Path relative to the project root.
    pub path: &'static str,
    pub lines: &'static [&'static str],
}

impl Template {
    pub fn render_line(line: &str, project_name: &str) -> String {
        if line.contains(PLACEHOLDER) {
            line.replace(PLACEHOLDER, project_name)
        } else {
            line.to_string()
        }
    }

    pub fn render(&self, project_name: &str) -> String {
        let mut out = String::new();
        for line in self.lines {
            out.push_str(&Self::render_line(line, project_name));
            out.push('\n');
        }
        out
    }
}

pub const GDBINIT: Template = Template {
    name: "gdbinit",
    path: "gdbinit",
    lines: &[
        "set $_exitcode = -1",
        "run",
        "if $_exitcode != -1",
        "    quit",
        "end",
    ],
};

pub const CMAKE_LISTS: Template = Template {
    name: "cmake",
    path: "CMakeLists.txt",
    lines: &[
        "cmake_minimum_required(VERSION 3.10)",
        "project(%s VERSION 0.1)",
        "set(CMAKE_C_STANDARD 99)",
        "set(CMAKE_C_STANDARD_REQUIRED True)",
        "set(EXECUTABLE_OUTPUT_PATH ${CMAKE_BINARY_DIR}/bin)",
        "file(GLOB SOURCES \"src/*.c\")",
        "add_executable(%s ${SOURCES})",
        "target_include_directories(%s PUBLIC ${PROJECT_BINARY_DIR})",
        "add_subdirectory(./deps/raylib)",
        "target_link_libraries(%s PRIVATE raylib)",
        "if (${CMAKE_SYSTEM_NAME} MATCHES \"Linux\")",
        "    target_link_libraries(%s PRIVATE glfw m pthread)",
        "elseif (${CMAKE_SYSTEM_NAME} MATCHES \"Windows\")",
        "    target_link_libraries(%s PRIVATE opengl32 gdi32)",
        "endif()",
        "file(COPY res/ DESTINATION ${EXECUTABLE_OUTPUT_PATH}/res)",
    ],
};

pub const BUILD_SH: Template = Template {
    name: "build-sh",
    path: "build.sh",
    lines: &[
        "#!/bin/bash",
        "# check if build directory exists",
        "if [ ! -d \"build\" ]; then",
        "  mkdir build",
        "fi",
        "cd build",
        "cmake ..",
        "make",
    ],
};

pub const DEBUG_SH: Template = Template {
    name: "debug-sh",
    path: "debug.sh",
    lines: &["#!/bin/bash", "./build.sh", "gdb -x gdbinit ./build/bin/%s"],
};

pub const BUILD_BAT: Template = Template {
    name: "build-bat",
    path: "build.bat",
    lines: &[
        "@echo off",
        "IF NOT EXIST \"build\" (",
        "  mkdir build",
        ")",
        "cd build",
        "cmake .. -G \"MinGW Makefiles\"",
        "cmake --build .",
    ],
};

pub const MAIN_C: Template = Template {
    name: "main-c",
    path: "src/main.c",
    lines: &[
        "#include \"raylib.h\"\n",
        "#define SCREEN_WIDTH 640",
        "#define SCREEN_HEIGHT 480",
        "int main(void)",
        "{",
        "    InitWindow(SCREEN_WIDTH, SCREEN_HEIGHT, \"%s\");",
        "    SetTargetFPS(60);",
        "    while (!WindowShouldClose()) {",
        "        BeginDrawing();",
        "            ClearBackground(RAYWHITE);",
        "            DrawText(\"Hello, World!\", 0, 0, 40, BLACK);",
        "        EndDrawing();",
        "    }",
        "    CloseWindow();",
        "    return 0;",
        "}",
    ],
};

/// Written in this order.
pub const TEMPLATES: &[Template] = &[GDBINIT, CMAKE_LISTS, BUILD_SH, DEBUG_SH, BUILD_BAT, MAIN_C];

/// Scripts that get the executable bit after generation.
pub const EXECUTABLE_SCRIPTS: &[&str] = &[BUILD_SH.path, DEBUG_SH.path];
